//! Topic rules for contract questions.
//!
//! Each rule fires when any of its patterns occurs in the lowercased
//! question; the first firing rule wins. The general and core tables keep
//! separate orderings, so a question such as "Assignment 시 ROFR" counts
//! assignment keywords while anchoring on the ROFR core terms.

pub struct TopicRule {
    pub patterns: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

const fn rule(
    patterns: &'static [&'static str],
    keywords: &'static [&'static str],
) -> TopicRule {
    TopicRule { patterns, keywords }
}

pub const TOPIC_KEYWORDS: &[TopicRule] = &[
    rule(
        &["해지", "termination"],
        &["해지", "종료", "termination", "terminate", "suspension", "withdrawal"],
    ),
    rule(
        &["force majeure", "불가항력"],
        &["force majeure", "불가항력", "act of god", "beyond reasonable control"],
    ),
    rule(
        &["operator", "지정", "해임"],
        &["operator", "appointment", "removal", "operatorship", "designation"],
    ),
    rule(
        &["participating interest", "산정", "변경", "지분"],
        &[
            "participating interest",
            "working interest",
            "equity interest",
            "allocation",
            "re-determination",
            "지분",
        ],
    ),
    rule(
        &["default", "remedies", "remedy"],
        &["default", "event of default", "breach", "cure period", "remedies", "remedy"],
    ),
    rule(
        &["withdrawal", "surrender"],
        &["withdrawal", "surrender", "relinquishment"],
    ),
    rule(
        &["assignment", "양도", "승인"],
        &["assignment", "assign", "transfer", "consent", "approval"],
    ),
    rule(
        &["중재", "분쟁", "arbitration", "dispute"],
        &["arbitration", "dispute", "dispute resolution", "governing law", "seat of arbitration"],
    ),
    rule(
        &["audit", "감사", "회계"],
        &["audit", "audit rights", "books and records", "inspection", "accounting"],
    ),
    rule(
        &["cost recovery", "profit oil", "배분"],
        &["cost recovery", "profit oil", "cost oil", "recoverable cost", "allocation"],
    ),
    rule(
        &["royalty", "세금", "tax"],
        &[
            "royalty",
            "royalties",
            "tax",
            "withholding tax",
            "income tax",
            "petroleum tax",
            "vat",
            "royalty rate",
            "fiscal terms",
        ],
    ),
    rule(
        &["joint operating committee", "joc", "operating committee", "management committee"],
        &[
            "joint operating committee",
            "operating committee",
            "management committee",
            "committee",
            "quorum",
            "voting",
            "decision",
        ],
    ),
    rule(
        &["carried interest", "carried"],
        &["carried interest", "carry", "free carry", "carried costs", "carrying party"],
    ),
    rule(
        &["정부 참여", "state participation", "government participation", "back-in"],
        &[
            "state participation",
            "government participation",
            "noc",
            "national oil company",
            "back-in right",
            "state back-in",
        ],
    ),
    rule(
        &["confidentiality", "비밀", "비밀유지", "nda"],
        &[
            "confidentiality",
            "confidential information",
            "non-disclosure",
            "nda",
            "use restriction",
        ],
    ),
    rule(
        &["hse", "환경", "안전", "보건"],
        &[
            "hse",
            "health",
            "safety",
            "environment",
            "environmental",
            "pollution",
            "spill",
            "hazard",
            "환경",
            "안전",
        ],
    ),
    rule(
        &["abandonment", "decommission", "비용 분담"],
        &[
            "abandonment",
            "decommissioning",
            "site restoration",
            "plug and abandon",
            "p&a",
            "abandonment fund",
            "decommissioning fund",
            "cost sharing",
            "apportionment",
        ],
    ),
    rule(
        &["work program", "budget", "wp&b"],
        &[
            "work program",
            "program and budget",
            "wp&b",
            "annual work plan",
            "budget approval",
            "afe",
            "authorization for expenditure",
        ],
    ),
    rule(
        &["take or pay", "make up gas", "make-up gas"],
        &[
            "take or pay",
            "take-or-pay",
            "make up gas",
            "make-up gas",
            "deficiency",
            "deliver or pay",
            "top",
            "mug",
        ],
    ),
    rule(
        &["lifting", "nomination", "오프테이크"],
        &[
            "lifting",
            "nomination",
            "offtake",
            "lifting program",
            "lifting schedule",
            "cargo nomination",
            "scheduling",
        ],
    ),
    rule(
        &["insurance", "보험"],
        &[
            "insurance",
            "insurer",
            "coverage",
            "policy",
            "liability",
            "deductible",
            "additional insured",
            "waiver of subrogation",
        ],
    ),
    rule(
        &["회계처리 기준", "accounting standards", "gaap", "ifrs"],
        &["accounting standards", "gaap", "ifrs", "accounting policy", "principles", "methods"],
    ),
    rule(
        &["가격평가", "valuation", "가격"],
        &[
            "valuation",
            "price",
            "pricing",
            "market price",
            "reference price",
            "platts",
            "brent",
            "henry hub",
            "index",
        ],
    ),
    rule(
        &["현지화", "로컬콘텐츠", "local content"],
        &[
            "local content",
            "domestic content",
            "local employment",
            "local procurement",
            "in-country value",
            "icv",
        ],
    ),
    rule(
        &["rofr", "우선매수권", "right of first refusal", "pre-emption", "preemption"],
        &[
            "right of first refusal",
            "rofr",
            "preferential right",
            "pre-emption",
            "preemptive right",
        ],
    ),
    rule(
        &["잔여의무", "post-termination", "survival"],
        &["post-termination", "survival", "surviving obligations", "continuing obligations"],
    ),
    rule(
        &["venue", "중재장소", "place of arbitration", "seat"],
        &["venue", "place of arbitration", "seat", "forum"],
    ),
    rule(
        &["amendment", "변경", "개정", "variation", "modify"],
        &[
            "amendment",
            "amend",
            "variation",
            "modify",
            "change",
            "written amendment",
            "change order",
        ],
    ),
    rule(
        &["joint account", "계정", "jib", "billing", "cash call"],
        &[
            "joint account",
            "joint interest billing",
            "jib",
            "cash call",
            "statement",
            "billing",
            "operator accounting",
        ],
    ),
    rule(
        &["현지채용", "훈련", "training"],
        &[
            "local employment",
            "training",
            "training program",
            "capacity building",
            "local training",
            "local hire",
        ],
    ),
];

pub const TOPIC_CORE_KEYWORDS: &[TopicRule] = &[
    rule(
        &["rofr", "right of first refusal", "우선매수권", "pre-emption", "preemption"],
        &["right of first refusal", "rofr"],
    ),
    rule(
        &["venue", "seat", "place of arbitration", "중재장소"],
        &["venue", "seat"],
    ),
    rule(
        &["회계처리 기준", "accounting standards", "gaap", "ifrs"],
        &["accounting standards", "gaap", "ifrs"],
    ),
    rule(&["royalty", "세금", "tax"], &["royalty", "tax"]),
    rule(
        &["joint operating committee", "operating committee", "management committee", "joc"],
        &["operating committee", "committee"],
    ),
    rule(&["carried interest", "carried"], &["carried interest"]),
    rule(
        &["정부 참여", "state participation", "government participation", "back-in"],
        &["state participation"],
    ),
    rule(
        &["confidentiality", "비밀", "비밀유지", "nda"],
        &["confidentiality"],
    ),
    rule(&["hse", "환경", "안전", "보건"], &["hse"]),
    rule(
        &["abandonment", "decommission", "비용 분담"],
        &["abandonment", "decommissioning"],
    ),
    rule(&["work program", "wp&b", "budget"], &["work program", "budget"]),
    rule(
        &["take or pay", "take-or-pay", "make up gas", "make-up gas"],
        &["take or pay", "make up gas"],
    ),
    rule(
        &["lifting", "nomination", "offtake", "오프테이크"],
        &["lifting", "nomination"],
    ),
    rule(&["insurance", "보험"], &["insurance"]),
    rule(&["valuation", "가격평가", "가격"], &["valuation", "price"]),
    rule(&["현지화", "로컬콘텐츠", "local content"], &["local content"]),
    rule(&["잔여의무", "post-termination", "survival"], &["survival"]),
    rule(&["amendment", "변경", "개정", "variation"], &["amendment"]),
    rule(
        &["joint account", "jib", "billing", "cash call", "계정"],
        &["joint account"],
    ),
    rule(&["현지채용", "훈련", "training"], &["training"]),
    rule(&["해지", "termination"], &["termination", "해지"]),
    rule(&["force majeure", "불가항력"], &["force majeure", "불가항력"]),
    rule(&["operator", "지정", "해임"], &["operator"]),
    rule(
        &["participating interest", "지분"],
        &["participating interest", "working interest"],
    ),
    rule(&["default", "remedies", "위반"], &["default", "breach", "remedies"]),
    rule(&["withdrawal", "surrender"], &["withdrawal", "surrender"]),
    rule(
        &["assignment", "양도", "승인"],
        &["assignment", "consent", "approval"],
    ),
    rule(&["중재", "분쟁", "arbitration"], &["arbitration", "dispute"]),
    rule(&["audit", "감사", "회계"], &["audit"]),
    rule(
        &["cost recovery", "profit oil", "배분"],
        &["cost recovery", "profit oil"],
    ),
];

/// Built-in evaluation questions for the question × contract matrix.
pub const DEFAULT_QUESTIONS: &[&str] = &[
    "계약 해지 조건",
    "Force Majeure 규정",
    "Operator 지정/해임",
    "Participating Interest 산정/변경",
    "Default 및 Remedies",
    "Withdrawal/Surrender",
    "Assignment/양도 승인",
    "분쟁해결(중재)",
    "회계 및 감사(Audit)",
    "Cost Recovery/Profit Oil 배분",
    "Royalty 및 세금",
    "Joint Operating Committee",
    "Carried Interest",
    "정부 참여",
    "Confidentiality",
    "환경/안전(HSE)",
    "Abandonment 비용 분담",
    "Work Program & Budget",
    "Take or Pay/Make Up Gas",
    "Lifting/Nomination",
    "Insurance",
    "회계처리 기준",
    "산출물 가격평가(Valuation)",
    "현지화/로컬콘텐츠",
    "Assignment 시 ROFR",
    "계약 종료 후 잔여의무",
    "중재장소(Venue)",
    "계약변경(Amendment)",
    "Joint Account 관리",
    "현지채용/훈련",
];

/// Keyword sets derived from one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryKeywords {
    pub general: Vec<String>,
    pub core: Vec<String>,
}

impl QueryKeywords {
    pub fn for_question(question: &str) -> Self {
        let lowered = question.to_lowercase();

        let general = match first_matching_rule(TOPIC_KEYWORDS, &lowered) {
            Some(rule) => owned(rule.keywords),
            None => lowered.split_whitespace().map(str::to_string).collect(),
        };
        let core = first_matching_rule(TOPIC_CORE_KEYWORDS, &lowered)
            .map(|rule| owned(rule.keywords))
            .unwrap_or_default();

        Self { general, core }
    }

    /// Search text: the question followed by its keywords and header words.
    pub fn expanded_query(&self, question: &str) -> String {
        format!("{} {} Clause Article Section", question, self.general.join(" "))
    }
}

fn first_matching_rule<'a>(rules: &'a [TopicRule], lowered: &str) -> Option<&'a TopicRule> {
    rules
        .iter()
        .find(|rule| rule.patterns.iter().any(|pattern| lowered.contains(pattern)))
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
