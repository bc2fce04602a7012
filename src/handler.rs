//! Query-level decisions.
//!
//! Turns a DNS query into a block/allow decision against a [`Registry`], and
//! builds the answer sent back for blocked names. Forwarding allowed queries
//! is left to the caller.

use hickory_proto::op::{Message, MessageType, ResponseCode};

use crate::blocklist::order::canonicalize;
use crate::registry::Registry;

/// Outcome of checking a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Pass the query on.
    Allowed,
    /// Deny the query; `blocker` names the list that matched.
    Blocked { blocker: String },
}

impl Decision {
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Queries the registry can't decide on.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0} questions is not 1")]
    QuestionCount(usize),
}

/// Decide whether `query` should be blocked.
///
/// # Errors
///
/// Returns [`QueryError::QuestionCount`] unless the query holds exactly one
/// question.
pub fn decide(registry: &Registry, query: &Message) -> Result<Decision, QueryError> {
    let [question] = query.queries() else {
        return Err(QueryError::QuestionCount(query.queries().len()));
    };

    let name = question.name().to_ascii();
    let host = canonicalize(&name);
    match registry.block(&host) {
        Some(blocker) => {
            tracing::debug!(host = %host, blocker = %blocker, "blocked");
            Ok(Decision::Blocked {
                blocker: blocker.to_string(),
            })
        }
        None => {
            tracing::trace!(host = %host, "allowed");
            Ok(Decision::Allowed)
        }
    }
}

/// Build the answer for a blocked query: the name doesn't exist.
#[must_use]
pub fn nxdomain_response(query: &Message) -> Message {
    let mut response = Message::new();
    response
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(query.op_code())
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NXDomain);

    for q in query.queries() {
        response.add_query(q.clone());
    }

    response
}
