//! SQL for each metric family.
//!
//! Aggregates are cast to `float8` so every value column scans as `f64`.
//! Call-detail families count records whose `end_stamp` falls in the last
//! `TRAILING_WINDOW_SECS` seconds.

use pbxgauge_core::{DomainFamily, TRAILING_WINDOW_SECS};

pub const DOMAIN_COUNT: &str = "SELECT COUNT(*)::float8 FROM v_domains";

/// `<column> > clock_timestamp() - INTERVAL '<window> seconds'`
fn within_window(column: &str) -> String {
    format!("{column} > clock_timestamp() - INTERVAL '{TRAILING_WINDOW_SECS} seconds'")
}

/// Query returning `(domain_name text, value float8)` rows for `family`.
pub fn family_sql(family: DomainFamily) -> String {
    match family {
        DomainFamily::Extensions => "SELECT d.domain_name, COUNT(e.extension)::float8 \
             FROM v_domains d JOIN v_extensions e ON d.domain_uuid = e.domain_uuid \
             GROUP BY d.domain_name"
            .to_string(),
        DomainFamily::AnsweredCalls => format!(
            "SELECT d.domain_name, COUNT(*)::float8 \
             FROM v_domains d JOIN v_xml_cdr c ON d.domain_uuid = c.domain_uuid \
             WHERE c.hangup_cause = 'NORMAL_CLEARING' AND {} \
             GROUP BY d.domain_name",
            within_window("c.end_stamp")
        ),
        DomainFamily::OutboundCalls => format!(
            "SELECT domain_name, COUNT(*)::float8 FROM v_xml_cdr \
             WHERE direction = 'outbound' AND {} \
             GROUP BY domain_name",
            within_window("end_stamp")
        ),
        // LOSE_RACE legs are the losers of a simultaneous ring and never reached anyone.
        DomainFamily::InboundCalls => format!(
            "SELECT domain_name, COUNT(*)::float8 FROM v_xml_cdr \
             WHERE direction = 'inbound' AND {} \
             AND hangup_cause != 'LOSE_RACE' \
             GROUP BY domain_name",
            within_window("end_stamp")
        ),
        DomainFamily::AverageMos => format!(
            "SELECT domain_name, AVG(rtp_audio_in_mos)::float8 FROM v_xml_cdr \
             WHERE {} GROUP BY domain_name",
            within_window("end_stamp")
        ),
        DomainFamily::AverageDuration => format!(
            "SELECT domain_name, AVG(duration)::float8 FROM v_xml_cdr \
             WHERE {} GROUP BY domain_name",
            within_window("end_stamp")
        ),
    }
}
