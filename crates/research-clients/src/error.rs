use research_contracts::RawItem;

/// The three ways a single client's participation in a discovery round can
/// end, distinguishing "breaker refused admission" from "the call itself
/// failed" so the discovery service can audit and recover differently.
pub enum ClientCallOutcome {
    Succeeded { client_name: String, items: Vec<RawItem> },
    Rejected { client_name: String },
    Failed { client_name: String, message: String },
}
