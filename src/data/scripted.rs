//! In-memory `Transport` that replays canned responses, for tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::json;

use crate::data::treasury::{HttpResponse, Transport};
use crate::error::AppError;

/// Replays `(status, body)` pairs in order and records every requested URL.
/// Running out of responses behaves like a refused connection.
pub(crate) struct ScriptedTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requested: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<(u16, String)>) -> Self {
        Self {
            responses: RefCell::new(
                responses
                    .into_iter()
                    .map(|(status, body)| HttpResponse { status, body })
                    .collect(),
            ),
            requested: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, AppError> {
        self.requested.borrow_mut().push(url.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| AppError::fetch("Treasury request failed: connection refused"))
    }
}

/// Build a response body shaped like the fiscal-data API.
pub(crate) fn page_body(rows: &[(&str, &str, &str)], total: Option<usize>, next: Option<&str>) -> String {
    let data: Vec<_> = rows
        .iter()
        .map(|(desc, rate, date)| {
            json!({
                "country_currency_desc": desc,
                "exchange_rate": rate,
                "record_date": date,
            })
        })
        .collect();

    let mut body = json!({
        "data": data,
        "links": { "self": "&page%5Bnumber%5D=1", "next": next },
    });
    if let Some(total) = total {
        body["meta"] = json!({ "count": rows.len(), "total-count": total });
    }
    body.to_string()
}
