//! 에너지 포트폴리오(계통 + 재생 + 연료전지) 비용 모듈.
//! 엔진과 독립적으로 쓰거나, 전력 단가 공급원으로 엔진에 연결한다.

pub mod lcoe;
pub mod mix;

pub use lcoe::*;
pub use mix::*;
