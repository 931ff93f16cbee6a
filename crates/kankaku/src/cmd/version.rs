use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("kankaku {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    println!(
        "build_target: {}",
        option_env!("KANKAKU_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "wire: header={}B record={}B",
        kankaku_frame::HEADER_SIZE,
        kankaku_frame::RECORD_SIZE
    );
    println!(
        "default_channel: {}",
        kankaku_transport::default_channel_path().display()
    );

    Ok(SUCCESS)
}
