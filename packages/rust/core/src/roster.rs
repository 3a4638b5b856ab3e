//! Target discovery: who the report investigates.

use scout_shared::Roster;

/// Integration partners, in search order.
pub const PARTNERS: [&str; 10] = [
    "Zoom",
    "Microsoft Teams",
    "Cisco Webex",
    "RingCentral",
    "Slack",
    "Box",
    "Salesforce",
    "Mural",
    "Miro",
    "Asana",
];

/// Archiving and supervision competitors, in search order.
pub const COMPETITORS: [&str; 10] = [
    "Microsoft Purview",
    "Smarsh",
    "Global Relay",
    "Proofpoint",
    "Veritas",
    "Mimecast",
    "ZL Tech",
    "SteelEye",
    "Shield",
    "LeapXpert",
];

/// The fixed roster. No network access; replaceable by a real crawler later.
pub fn discover_targets() -> Roster {
    Roster::new(
        PARTNERS.iter().map(|s| s.to_string()).collect(),
        COMPETITORS.iter().map(|s| s.to_string()).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_is_fixed_and_disjoint() {
        let roster = discover_targets();
        assert_eq!(roster.partners().len(), 10);
        assert_eq!(roster.competitors()[0], "Microsoft Purview");
        assert!(
            roster
                .partners()
                .iter()
                .all(|p| !roster.competitors().contains(p))
        );
        assert_eq!(discover_targets(), roster);
    }
}
