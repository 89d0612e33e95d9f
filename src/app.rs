use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{self, Config, ConfigError, DEFAULT_CONFIG_PATH};
use crate::energy::evaluate_portfolio;
use crate::engine::{self, EngineError, PricingMode, SgaSolveMode};
use crate::i18n::{self, keys, Translator};
use crate::logger::{self, LoggerError};
use crate::report;
use crate::scenario::{PowerChoice, ScenarioOverrides};
use crate::ui_cli;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum AppError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// 설정 저장/로드 오류
    Config(ConfigError),
    /// 타당성 계산 오류
    Engine(EngineError),
    /// 로거 초기화 오류
    Logger(LoggerError),
    /// 잘못된 명령행 인자
    InvalidArgument(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Io(e) => write!(f, "입출력 오류: {e}"),
            AppError::Config(e) => write!(f, "설정 오류: {e}"),
            AppError::Engine(e) => write!(f, "계산 오류: {e}"),
            AppError::Logger(e) => write!(f, "{e}"),
            AppError::InvalidArgument(msg) => write!(f, "잘못된 인자: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<EngineError> for AppError {
    fn from(value: EngineError) -> Self {
        AppError::Engine(value)
    }
}

impl From<LoggerError> for AppError {
    fn from(value: LoggerError) -> Self {
        AppError::Logger(value)
    }
}

/// AI 데이터센터 기술·경제 타당성 평가 도구.
#[derive(Debug, Parser)]
#[command(name = "dc_viability", version, about)]
pub struct Cli {
    /// 설정 파일 경로
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// 출력 언어 (ko, en, auto)
    #[arg(long, global = true, default_value = "auto")]
    pub lang: String,
    /// 로그 상세도 (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

/// 사용 가능한 명령.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 시나리오 하나를 평가한다.
    Evaluate {
        #[command(flatten)]
        opts: ScenarioOpts,
        /// 서술형 분석 리포트도 출력
        #[arg(long)]
        report: bool,
    },
    /// 네 가지 표준 전략을 비교한다.
    Benchmark {
        #[command(flatten)]
        opts: ScenarioOpts,
    },
    /// 에너지 포트폴리오 LCOE만 계산한다. 수요는 주어진 하드웨어 구성과 가동률에서 구한다.
    Energy {
        #[command(flatten)]
        opts: ScenarioOpts,
    },
    /// 기본 설정 파일을 쓴다.
    Init {
        /// 이미 있어도 덮어쓴다
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PricingArg {
    Usage,
    Fixed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SgaArg {
    Cost,
    Revenue,
}

/// 시나리오 조정값 플래그.
#[derive(Debug, Clone, Args)]
pub struct ScenarioOpts {
    /// 고성능 장비 예산 비율 [%]
    #[arg(long, default_value_t = 100.0)]
    pub hw_ratio: f64,
    /// 가동률 [%]
    #[arg(long, default_value_t = 70.0)]
    pub utilization: f64,
    /// 전력원 키. "portfolio"면 에너지 포트폴리오 LCOE를 쓴다.
    #[arg(long)]
    pub power: Option<String>,
    /// 아키텍처 최적화 적용
    #[arg(long)]
    pub arch: bool,
    #[arg(long, value_enum, default_value = "usage")]
    pub pricing: PricingArg,
    /// 판관비 처리 방식
    #[arg(long, value_enum, default_value = "revenue")]
    pub sga: SgaArg,
    /// 티어 월 요금 재정의 (name=value, 반복 가능)
    #[arg(long = "fee", value_name = "NAME=VALUE")]
    pub fees: Vec<String>,
}

impl ScenarioOpts {
    /// 플래그를 엔진 조정값으로 바꾼다. 퍼센트는 0~1 비율로 환산한다.
    pub fn to_overrides(&self) -> Result<ScenarioOverrides, AppError> {
        let power = match self.power.as_deref() {
            None => PowerChoice::Configured,
            Some("portfolio") => PowerChoice::Portfolio,
            Some(key) => PowerChoice::Source(key.to_string()),
        };
        Ok(ScenarioOverrides {
            high_performance_ratio: self.hw_ratio / 100.0,
            utilization: self.utilization / 100.0,
            power,
            architecture_optimised: self.arch,
            pricing: match self.pricing {
                PricingArg::Usage => PricingMode::UsageBased,
                PricingArg::Fixed => PricingMode::FixedFee,
            },
            sga_mode: match self.sga {
                SgaArg::Cost => SgaSolveMode::CostBasis,
                SgaArg::Revenue => SgaSolveMode::RevenueBasis,
            },
            fee_overrides: parse_fees(&self.fees)?,
        })
    }
}

/// "name=value" 목록을 티어 요금 재정의로 파싱한다.
pub fn parse_fees(raw: &[String]) -> Result<BTreeMap<String, f64>, AppError> {
    raw.iter()
        .map(|item| {
            let (name, value) = item
                .split_once('=')
                .ok_or_else(|| AppError::InvalidArgument(format!("'{item}' (name=value)")))?;
            let fee = value
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::InvalidArgument(format!("'{item}' 요금이 숫자가 아님")))?;
            Ok((name.trim().to_string(), fee))
        })
        .collect()
}

/// 명령을 실행한다.
pub fn run(cli: Cli) -> Result<(), AppError> {
    logger::init(cli.verbose)?;

    if let Command::Init { force } = &cli.command {
        return write_default_config(&cli.config, *force, &cli.lang);
    }

    let cfg = config::load_or_default(&cli.config)?;
    let lang = i18n::resolve_language(&cli.lang, cfg.language.as_deref());
    let tr = Translator::new_with_pack(&lang, None);

    match &cli.command {
        Command::Evaluate { opts, report } => {
            let overrides = opts.to_overrides()?;
            let summary = engine::evaluate(&cfg.scenario, &overrides)?;
            ui_cli::print_summary(&summary, &tr);
            if *report {
                let outcomes = engine::benchmark(&cfg.scenario, &overrides)?;
                print!("{}", report::narrative(&summary, &outcomes, &tr));
            }
        }
        Command::Benchmark { opts } => {
            let overrides = opts.to_overrides()?;
            let outcomes = engine::benchmark(&cfg.scenario, &overrides)?;
            ui_cli::print_benchmark(&outcomes, &tr);
        }
        Command::Energy { opts } => {
            let overrides = opts.to_overrides()?;
            let portfolio = cfg.scenario.energy.as_ref().ok_or_else(|| {
                EngineError::config("에너지 포트폴리오가 구성되지 않았습니다.")
            })?;
            let capacity = engine::facility_capacity(&cfg.scenario, &overrides)?;
            let result =
                evaluate_portfolio(portfolio, Some(engine::facility_demand_mwh(&capacity)))?;
            ui_cli::print_energy(&result, &tr);
        }
        Command::Init { .. } => {}
    }
    Ok(())
}

fn write_default_config(path: &Path, force: bool, lang: &str) -> Result<(), AppError> {
    let tr = Translator::new_with_pack(&i18n::resolve_language(lang, None), None);
    if path.exists() && !force {
        return Err(AppError::InvalidArgument(format!(
            "{} 파일이 이미 있습니다 (--force로 덮어쓰기)",
            path.display()
        )));
    }
    Config::default().save(path)?;
    println!("{} {}", tr.t(keys::CONFIG_WRITTEN), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_flags_are_parsed() {
        let fees = parse_fees(&["standard=25".into(), " premium = 150.5".into()]).unwrap();
        assert_eq!(fees["standard"], 25.0);
        assert_eq!(fees["premium"], 150.5);
        assert!(parse_fees(&["broken".into()]).is_err());
        assert!(parse_fees(&["a=x".into()]).is_err());
    }

    #[test]
    fn percent_flags_become_ratios() {
        let cli = Cli::parse_from(["dc_viability", "evaluate", "--hw-ratio", "50", "--arch"]);
        let Command::Evaluate { opts, .. } = cli.command else {
            panic!("expected evaluate");
        };
        let overrides = opts.to_overrides().unwrap();
        assert_eq!(overrides.high_performance_ratio, 0.5);
        assert_eq!(overrides.utilization, 0.7);
        assert!(overrides.architecture_optimised);
    }

    #[test]
    fn energy_takes_scenario_flags() {
        let cli = Cli::parse_from([
            "dc_viability",
            "energy",
            "--utilization",
            "50",
            "--hw-ratio",
            "0",
        ]);
        let Command::Energy { opts } = cli.command else {
            panic!("expected energy");
        };
        let overrides = opts.to_overrides().unwrap();
        assert_eq!(overrides.utilization, 0.5);
        assert_eq!(overrides.high_performance_ratio, 0.0);
    }
}
