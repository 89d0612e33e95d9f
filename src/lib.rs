//! 핵심 계산 로직을 라이브러리로 분리하여 CLI 외의 호출자도 같은 엔진을 쓰게 한다.

pub mod app;
pub mod config;
pub mod energy;
pub mod engine;
pub mod i18n;
pub mod logger;
pub mod report;
pub mod scenario;
pub mod ui_cli;
