//! archivers - TAR / ZIP 命令行工具
//!
//! 命令格式:
//!
//! ```text
//! archivers zip  <archive> <files...>
//! archivers tar  <archive> <files...>
//! archivers tgz  <archive> <files...>
//! archivers list <archive>
//! ```
//!
//! 设置 `RUST_LOG=debug` 查看详细日志。

use std::env;
use std::process::ExitCode;

// 退出码定义
const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("archivers");

    let Some(command) = parse_command(&args[1.min(args.len())..]) else {
        eprintln!("Usage: {program} <zip|tar|tgz> <archive> <files...>");
        eprintln!("       {program} list <archive>");
        return ExitCode::from(EXIT_USAGE);
    };

    if let Err(err) = run(command) {
        eprintln!("archivers error: {err}");
        return ExitCode::from(EXIT_FAILURE);
    }
    ExitCode::SUCCESS
}

#[derive(Debug)]
enum Command<'a> {
    Zip { archive: &'a str, files: &'a [String] },
    Tar { archive: &'a str, files: &'a [String], gzip: bool },
    List { archive: &'a str },
}

fn parse_command(args: &[String]) -> Option<Command<'_>> {
    match args {
        [cmd, archive] if cmd == "list" => Some(Command::List { archive }),
        [cmd, archive, files @ ..] if !files.is_empty() => match cmd.as_str() {
            "zip" => Some(Command::Zip { archive, files }),
            "tar" => Some(Command::Tar { archive, files, gzip: false }),
            "tgz" => Some(Command::Tar { archive, files, gzip: true }),
            _ => None,
        },
        _ => None,
    }
}

fn run(command: Command<'_>) -> archive_rs::Result<()> {
    match command {
        Command::Zip { archive, files } => archive_rs::create_zip(archive, files),
        Command::Tar { archive, files, gzip } => archive_rs::create_tar(archive, files, gzip),
        Command::List { archive } => {
            for name in archive_rs::list_tar(archive)? {
                println!("{name}");
            }
            Ok(())
        }
    }
}
