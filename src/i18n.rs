use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const CONFIG_WRITTEN: &str = "general.config_written";

    pub const SUMMARY_TITLE: &str = "summary.title";
    pub const SUMMARY_INVESTMENT: &str = "summary.investment";
    pub const SUMMARY_INVESTMENT_PER_MW: &str = "summary.investment_per_mw";
    pub const SUMMARY_HARDWARE_MIX: &str = "summary.hardware_mix";
    pub const SUMMARY_UTILIZATION: &str = "summary.utilization";
    pub const SUMMARY_SERVICED: &str = "summary.serviced";
    pub const SUMMARY_POWER: &str = "summary.power";
    pub const SUMMARY_ELECTRICITY_PRICE: &str = "summary.electricity_price";
    pub const SUMMARY_PRICING: &str = "summary.pricing";

    pub const PNL_TITLE: &str = "pnl.title";
    pub const PNL_REVENUE: &str = "pnl.revenue";
    pub const PNL_COST_OF_REVENUE: &str = "pnl.cost_of_revenue";
    pub const PNL_GROSS_PROFIT: &str = "pnl.gross_profit";
    pub const PNL_SGA: &str = "pnl.sga";
    pub const PNL_DEPRECIATION: &str = "pnl.depreciation";
    pub const PNL_RESEARCH: &str = "pnl.research_amortization";
    pub const PNL_OPERATING_PROFIT: &str = "pnl.operating_profit";
    pub const PNL_LINE_ITEMS: &str = "pnl.line_items";

    pub const TIERS_TITLE: &str = "tiers.title";
    pub const TIERS_HEADER: &str = "tiers.header";
    pub const TIERS_WHAT_IF_TITLE: &str = "tiers.what_if_title";
    pub const TIERS_WHAT_IF_HEADER: &str = "tiers.what_if_header";

    pub const VIABILITY_TITLE: &str = "viability.title";
    pub const VIABILITY_TARGET_IRR: &str = "viability.target_irr";
    pub const VIABILITY_MODE: &str = "viability.mode";
    pub const VIABILITY_REQUIRED_REVENUE: &str = "viability.required_revenue";
    pub const VIABILITY_UNIT_PRICE: &str = "viability.unit_price";
    pub const VIABILITY_MONTHLY_FEE: &str = "viability.monthly_fee";
    pub const VIABILITY_RECOMMENDED: &str = "viability.recommended";
    pub const VIABILITY_ACHIEVABLE: &str = "viability.achievable";
    pub const VIABILITY_NOT_ACHIEVABLE: &str = "viability.not_achievable";
    pub const PAYBACK: &str = "viability.payback";
    pub const PAYBACK_YEARS: &str = "viability.payback_years";
    pub const PAYBACK_UNRECOVERABLE: &str = "viability.payback_unrecoverable";
    pub const NPV: &str = "viability.npv";
    pub const BREAK_EVEN: &str = "viability.break_even";
    pub const BREAK_EVEN_USERS: &str = "viability.break_even_users";
    pub const BREAK_EVEN_UNREACHABLE: &str = "viability.break_even_unreachable";

    pub const MODE_COST_BASIS: &str = "mode.cost_basis";
    pub const MODE_REVENUE_BASIS: &str = "mode.revenue_basis";
    pub const PRICING_USAGE: &str = "pricing.usage";
    pub const PRICING_FIXED: &str = "pricing.fixed";

    pub const BENCHMARK_TITLE: &str = "benchmark.title";
    pub const BENCHMARK_HEADER: &str = "benchmark.header";
    pub const ARCH_ON: &str = "strategy.arch_on";
    pub const ARCH_OFF: &str = "strategy.arch_off";
    pub const HW_HIGH: &str = "strategy.hw_high";
    pub const HW_LOW: &str = "strategy.hw_low";
    pub const HW_HYBRID: &str = "strategy.hw_hybrid";

    pub const ENERGY_TITLE: &str = "energy.title";
    pub const ENERGY_HEADER: &str = "energy.header";
    pub const ENERGY_CAPACITY: &str = "energy.capacity";
    pub const ENERGY_TCO: &str = "energy.tco";
    pub const ENERGY_LCOE_RATIO: &str = "energy.lcoe_ratio";
    pub const ENERGY_LCOE_ANNUITIZED: &str = "energy.lcoe_annuitized";
    pub const ENERGY_EMISSIONS: &str = "energy.emissions";

    pub const NARRATIVE_TITLE: &str = "narrative.title";
    pub const NARRATIVE_CHOICE: &str = "narrative.choice";
    pub const NARRATIVE_DRIVER: &str = "narrative.driver";
    pub const NARRATIVE_DRIVER_ON: &str = "narrative.driver_on";
    pub const NARRATIVE_DRIVER_OFF: &str = "narrative.driver_off";
    pub const NARRATIVE_VIABILITY: &str = "narrative.viability";
    pub const NARRATIVE_RECOMMENDATION: &str = "narrative.recommendation";
    pub const REC_ARCH_HIGH: &str = "narrative.rec_arch_high";
    pub const REC_ARCH_LOW: &str = "narrative.rec_arch_low";
    pub const REC_ARCH_HYBRID: &str = "narrative.rec_arch_hybrid";
    pub const REC_NO_ARCH: &str = "narrative.rec_no_arch";
    pub const REC_PRICING: &str = "narrative.rec_pricing";
    pub const REC_BEST: &str = "narrative.rec_best";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("en") {
            Language::En
        } else {
            Language::Ko
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(ko/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 ko로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    /// 번역을 가져온다. 언어팩 -> 선택 언어 -> 한국어 -> 키 순으로 폴백한다.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return v;
        }
        let built_in = match self.lang {
            Language::En => en(key).or_else(|| ko(key)),
            Language::Ko => ko(key),
        };
        built_in.unwrap_or(key)
    }
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko".into()),
        other if other.starts_with("en") => Some("en".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LANG", "LC_ALL"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| normalize_locale_string(&v))
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    normalize_lang(&lang)
}

/// TOML 기반 언어팩을 로드한다. 중첩 테이블은 "a.b" 키로 평탄화한다.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let path = Path::new(dir).join(format!("{lang}.toml"));
    let content = fs::read_to_string(path).ok()?;
    parse_toml_to_map(&content)
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    walk(&format!("{prefix}.{k}"), v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "오류",
        CONFIG_WRITTEN => "기본 설정 파일을 저장했습니다:",
        SUMMARY_TITLE => "\n=== 사업 요약 ===",
        SUMMARY_INVESTMENT => "총 투자비",
        SUMMARY_INVESTMENT_PER_MW => "MW당 투자비",
        SUMMARY_HARDWARE_MIX => "장비 구성",
        SUMMARY_UTILIZATION => "가동률",
        SUMMARY_SERVICED => "연간 처리량",
        SUMMARY_POWER => "시설 전력",
        SUMMARY_ELECTRICITY_PRICE => "전력 단가",
        SUMMARY_PRICING => "요금 방식",
        PNL_TITLE => "\n-- 연간 손익 --",
        PNL_REVENUE => "매출",
        PNL_COST_OF_REVENUE => "매출원가",
        PNL_GROSS_PROFIT => "매출총이익",
        PNL_SGA => "판관비",
        PNL_DEPRECIATION => "감가상각비",
        PNL_RESEARCH => "R&D 상각",
        PNL_OPERATING_PROFIT => "영업이익",
        PNL_LINE_ITEMS => "비용 항목",
        TIERS_TITLE => "\n-- 사용자당 수익성 (월) --",
        TIERS_HEADER => "티어        사용자수      매출/인     비용/인     이익/인",
        TIERS_WHAT_IF_TITLE => "\n-- 정액 요금 시나리오 (월) --",
        TIERS_WHAT_IF_HEADER => "티어        정액요금      요금마진     기회비용",
        VIABILITY_TITLE => "\n-- 사업 타당성 --",
        VIABILITY_TARGET_IRR => "목표 IRR",
        VIABILITY_MODE => "판관비 처리",
        VIABILITY_REQUIRED_REVENUE => "필요 연매출",
        VIABILITY_UNIT_PRICE => "필요 단가 ($/백만 단위)",
        VIABILITY_MONTHLY_FEE => "과금 사용자당 필요 월 요금",
        VIABILITY_RECOMMENDED => "권장 월 요금",
        VIABILITY_ACHIEVABLE => "달성 가능",
        VIABILITY_NOT_ACHIEVABLE => "상한 초과",
        PAYBACK => "회수기간",
        PAYBACK_YEARS => "년",
        PAYBACK_UNRECOVERABLE => "분석 기간 내 회수 불가",
        NPV => "NPV (목표 IRR)",
        BREAK_EVEN => "손익분기점 사용자 수",
        BREAK_EVEN_USERS => "명",
        BREAK_EVEN_UNREACHABLE => "도달 불가 (사용자당 순매출 없음)",
        MODE_COST_BASIS => "비용 기준 (판관비 사후 가산)",
        MODE_REVENUE_BASIS => "매출 기준 (동시 해)",
        PRICING_USAGE => "사용량 과금",
        PRICING_FIXED => "월 정액",
        BENCHMARK_TITLE => "\n=== 표준 전략 비교 ===",
        BENCHMARK_HEADER => "전략                           MW당 투자비    필요 단가     회수기간",
        ARCH_ON => "아키텍처 적용",
        ARCH_OFF => "아키텍처 미적용",
        HW_HIGH => "고성능 중심",
        HW_LOW => "저가 장비 중심",
        HW_HYBRID => "혼합 구성",
        ENERGY_TITLE => "\n=== 에너지 포트폴리오 ===",
        ENERGY_HEADER => "연도   수요(MWh)     CAPEX        운영비       배출(t)    배출계수",
        ENERGY_CAPACITY => "설치 용량",
        ENERGY_TCO => "총소유비용(현재가치)",
        ENERGY_LCOE_RATIO => "LCOE (PV 비율)",
        ENERGY_LCOE_ANNUITIZED => "LCOE (CRF 연금화)",
        ENERGY_EMISSIONS => "총 배출량",
        NARRATIVE_TITLE => "\n=== 분석 리포트 ===",
        NARRATIVE_CHOICE => "선택한 전략",
        NARRATIVE_DRIVER => "핵심 동인",
        NARRATIVE_DRIVER_ON => "아키텍처 최적화로 같은 장비에서 더 많은 처리량을 얻어 단위 원가가 낮아집니다.",
        NARRATIVE_DRIVER_OFF => "아키텍처 최적화 없이 장비 처리량만으로 원가를 감당해야 합니다.",
        NARRATIVE_VIABILITY => "목표 수익률 달성 조건",
        NARRATIVE_RECOMMENDATION => "전략적 제언",
        REC_ARCH_HIGH => "아키텍처와 고성능 장비를 함께 쓰는 구성이 처리량 대비 원가가 가장 낮습니다.",
        REC_ARCH_LOW => "저가 장비로도 아키텍처 효과가 투자비 부담을 상쇄합니다. 초기 자본이 제한적일 때 유리합니다.",
        REC_ARCH_HYBRID => "혼합 구성은 위험을 분산하지만 두 극단 전략과 비교해 단가를 확인하세요.",
        REC_NO_ARCH => "아키텍처 최적화 적용을 우선 검토하세요. 같은 투자로 필요 단가를 크게 낮출 수 있습니다.",
        REC_BEST => "최저 필요 단가 전략",
        REC_PRICING => "권장 요금이 티어 상한을 넘으면 가동률 또는 요금 구조를 다시 검토해야 합니다.",
        "cost.electricity" => "전력비",
        "cost.maintenance" => "유지보수비",
        "cost.personnel" => "인건비",
        "cost.building_depreciation" => "건물 감가상각",
        "cost.hardware_depreciation" => "하드웨어 감가상각",
        "cost.research_amortization" => "R&D 상각",
        "cost.sga" => "판관비",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        CONFIG_WRITTEN => "Default configuration written to:",
        SUMMARY_TITLE => "\n=== Business Summary ===",
        SUMMARY_INVESTMENT => "Total investment",
        SUMMARY_INVESTMENT_PER_MW => "Investment per MW",
        SUMMARY_HARDWARE_MIX => "Hardware mix",
        SUMMARY_UTILIZATION => "Utilization",
        SUMMARY_SERVICED => "Annual serviced throughput",
        SUMMARY_POWER => "Facility power",
        SUMMARY_ELECTRICITY_PRICE => "Electricity price",
        SUMMARY_PRICING => "Pricing mode",
        PNL_TITLE => "\n-- Annual P&L --",
        PNL_REVENUE => "Revenue",
        PNL_COST_OF_REVENUE => "Cost of revenue",
        PNL_GROSS_PROFIT => "Gross profit",
        PNL_SGA => "SG&A",
        PNL_DEPRECIATION => "Depreciation",
        PNL_RESEARCH => "R&D amortization",
        PNL_OPERATING_PROFIT => "Operating profit",
        PNL_LINE_ITEMS => "Cost line items",
        TIERS_TITLE => "\n-- Per-User Profitability (monthly) --",
        TIERS_HEADER => "Tier        Users         Rev/user    Cost/user   Profit/user",
        TIERS_WHAT_IF_TITLE => "\n-- Fixed-Fee What-If (monthly) --",
        TIERS_WHAT_IF_HEADER => "Tier        Fee           Fee margin   Opportunity cost",
        VIABILITY_TITLE => "\n-- Viability --",
        VIABILITY_TARGET_IRR => "Target IRR",
        VIABILITY_MODE => "SG&A resolution",
        VIABILITY_REQUIRED_REVENUE => "Required annual revenue",
        VIABILITY_UNIT_PRICE => "Required price ($/M units)",
        VIABILITY_MONTHLY_FEE => "Required monthly fee per paying user",
        VIABILITY_RECOMMENDED => "Recommended monthly fee",
        VIABILITY_ACHIEVABLE => "achievable",
        VIABILITY_NOT_ACHIEVABLE => "above ceiling",
        PAYBACK => "Payback period",
        PAYBACK_YEARS => "years",
        PAYBACK_UNRECOVERABLE => "not recoverable within horizon",
        NPV => "NPV (at target IRR)",
        BREAK_EVEN => "Break-even user estimate",
        BREAK_EVEN_USERS => "users",
        BREAK_EVEN_UNREACHABLE => "unreachable (no net revenue per user)",
        MODE_COST_BASIS => "cost basis (SG&A added after)",
        MODE_REVENUE_BASIS => "revenue basis (simultaneous)",
        PRICING_USAGE => "usage-based",
        PRICING_FIXED => "fixed monthly fee",
        BENCHMARK_TITLE => "\n=== Strategy Benchmark ===",
        BENCHMARK_HEADER => "Strategy                       Invest/MW      Req. price    Payback",
        ARCH_ON => "architecture on",
        ARCH_OFF => "architecture off",
        HW_HIGH => "high-performance",
        HW_LOW => "low-cost",
        HW_HYBRID => "hybrid",
        ENERGY_TITLE => "\n=== Energy Portfolio ===",
        ENERGY_HEADER => "Year   Demand(MWh)   CAPEX        OPEX         CO2(t)     EF(kg/kWh)",
        ENERGY_CAPACITY => "Installed capacity",
        ENERGY_TCO => "Total cost of ownership (PV)",
        ENERGY_LCOE_RATIO => "LCOE (PV ratio)",
        ENERGY_LCOE_ANNUITIZED => "LCOE (CRF annuitized)",
        ENERGY_EMISSIONS => "Total emissions",
        NARRATIVE_TITLE => "\n=== Analysis Report ===",
        NARRATIVE_CHOICE => "Your strategy",
        NARRATIVE_DRIVER => "Key driver",
        NARRATIVE_DRIVER_ON => "Architecture optimisation extracts more throughput from the same hardware and lowers unit cost.",
        NARRATIVE_DRIVER_OFF => "Without architecture optimisation, raw hardware throughput has to carry the full cost base.",
        NARRATIVE_VIABILITY => "Conditions for the target return",
        NARRATIVE_RECOMMENDATION => "Recommendation",
        REC_ARCH_HIGH => "Architecture plus high-performance hardware gives the lowest cost per unit of throughput.",
        REC_ARCH_LOW => "The architecture gain offsets the weaker hardware; attractive when capital is constrained.",
        REC_ARCH_HYBRID => "A hybrid mix spreads risk; compare its required price with both pure strategies.",
        REC_NO_ARCH => "Consider architecture optimisation first; it cuts the required price for the same investment.",
        REC_BEST => "Lowest required price",
        REC_PRICING => "If recommended fees exceed tier ceilings, revisit utilization or the pricing structure.",
        "cost.electricity" => "Electricity",
        "cost.maintenance" => "Maintenance",
        "cost.personnel" => "Personnel",
        "cost.building_depreciation" => "Building depreciation",
        "cost.hardware_depreciation" => "Hardware depreciation",
        "cost.research_amortization" => "R&D amortization",
        "cost.sga" => "SG&A",
        _ => return None,
    })
}
