use clap::Parser;
use dc_viability::app::{self, Cli};
use dc_viability::i18n::{self, keys, Translator};
use dc_viability::logger::is_logger_initialised;

/// 프로그램의 엔트리 포인트. 명령행을 해석한 뒤 애플리케이션을 실행한다.
fn main() {
    let cli = Cli::parse();
    let tr = Translator::new(&i18n::resolve_language(&cli.lang, None));
    if let Err(err) = try_run(cli) {
        if is_logger_initialised() {
            log::error!("{err}");
        }
        eprintln!("{}: {err}", tr.t(keys::ERROR_PREFIX));
        std::process::exit(1);
    }
}

fn try_run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    app::run(cli)?;
    Ok(())
}
