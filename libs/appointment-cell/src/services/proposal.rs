// libs/appointment-cell/src/services/proposal.rs
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::BookingProposal;

static BOOKING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[BOOKING_REQUEST\](.*?)\[/BOOKING_REQUEST\]")
        .expect("booking block pattern is valid")
});

/// Pulls the machine-readable booking block out of assistant replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProposalParser;

impl ProposalParser {
    /// The first `[BOOKING_REQUEST]` block, if present and valid JSON.
    pub fn parse_booking(text: &str) -> Option<BookingProposal> {
        let body = BOOKING_BLOCK.captures(text)?.get(1)?.as_str().trim();

        match serde_json::from_str::<BookingProposal>(body) {
            Ok(proposal) => {
                debug!(
                    "Parsed booking proposal with {} appointment(s)",
                    proposal.appointments.len()
                );
                Some(proposal)
            }
            Err(e) => {
                warn!("Discarding malformed booking block: {}", e);
                None
            }
        }
    }

    /// The reply text with every booking block removed, trimmed.
    pub fn strip_booking(text: &str) -> String {
        BOOKING_BLOCK.replace_all(text, "").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"Great, you're all set!
[BOOKING_REQUEST]
{
  "patient_name": "Ana Lopez",
  "patient_phone": "+1-555-0100",
  "appointments": [
    {
      "procedure_id": "rct_consult",
      "clinic_id": "downtown",
      "date": "2025-03-03",
      "start_time": "09:00",
      "primary_doctor_id": "dr_morgan",
      "doctor_ids": ["dr_morgan"],
      "notes": "lower left molar"
    }
  ]
}
[/BOOKING_REQUEST]"#;

    #[test]
    fn test_parse_booking_spanning_lines() {
        let proposal = ProposalParser::parse_booking(REPLY).unwrap();

        assert_eq!(proposal.patient_name, "Ana Lopez");
        assert_eq!(proposal.patient_phone.as_deref(), Some("+1-555-0100"));
        assert_eq!(proposal.appointments.len(), 1);
        assert_eq!(proposal.appointments[0].start_time, "09:00");
        assert_eq!(proposal.appointments[0].notes.as_deref(), Some("lower left molar"));
    }

    #[test]
    fn test_parse_booking_missing_or_invalid() {
        assert!(ProposalParser::parse_booking("No booking yet, which day suits you?").is_none());
        assert!(ProposalParser::parse_booking("[BOOKING_REQUEST]{not json}[/BOOKING_REQUEST]").is_none());
        assert!(ProposalParser::parse_booking("[BOOKING_REQUEST]{\"patient_name\": \"x\"}").is_none());
    }

    #[test]
    fn test_strip_booking() {
        assert_eq!(ProposalParser::strip_booking(REPLY), "Great, you're all set!");
        assert_eq!(ProposalParser::strip_booking("  plain reply \n"), "plain reply");
    }
}
