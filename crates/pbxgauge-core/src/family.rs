//! Fixed metric catalogue.
//!
//! The set of families is decided at build time; label values (domain names)
//! are discovered at runtime from query results.

/// Label key shared by every per-domain family.
pub const DOMAIN_LABEL: &str = "domain";

/// Call-detail families look back this far from "now", anchored on `end_stamp`.
pub const TRAILING_WINDOW_SECS: u32 = 30;

/// Per-domain gauge families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DomainFamily {
    Extensions,
    AnsweredCalls,
    OutboundCalls,
    InboundCalls,
    AverageMos,
    AverageDuration,
}

impl DomainFamily {
    /// Refresh order. Deterministic so logs and partial failures are reproducible.
    pub const ALL: [DomainFamily; 6] = [
        DomainFamily::Extensions,
        DomainFamily::AnsweredCalls,
        DomainFamily::OutboundCalls,
        DomainFamily::InboundCalls,
        DomainFamily::AverageMos,
        DomainFamily::AverageDuration,
    ];

    /// Exposition name.
    pub fn name(self) -> &'static str {
        match self {
            DomainFamily::Extensions => "extensions_per_domain",
            DomainFamily::AnsweredCalls => "answered_calls_per_domain",
            DomainFamily::OutboundCalls => "outbound_calls_per_domain",
            DomainFamily::InboundCalls => "inbound_calls_per_domain",
            DomainFamily::AverageMos => "average_mos_per_domain",
            DomainFamily::AverageDuration => "avg_call_duration_per_domain",
        }
    }

    /// `# HELP` text.
    pub fn help(self) -> &'static str {
        match self {
            DomainFamily::Extensions => "Number of extensions per domain",
            DomainFamily::AnsweredCalls => "Number of answered calls per domain",
            DomainFamily::OutboundCalls => "Number of outbound calls per domain",
            DomainFamily::InboundCalls => "Number of inbound calls per domain",
            DomainFamily::AverageMos => "Average MOS per domain",
            DomainFamily::AverageDuration => "Average call duration per domain",
        }
    }
}

/// Unlabelled, process-wide gauges. Registered once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalMetric {
    DomainsCount,
}

impl GlobalMetric {
    pub const ALL: [GlobalMetric; 1] = [GlobalMetric::DomainsCount];

    pub fn name(self) -> &'static str {
        match self {
            GlobalMetric::DomainsCount => "domains_count",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            GlobalMetric::DomainsCount => "Number of domains in v_domains table",
        }
    }
}
