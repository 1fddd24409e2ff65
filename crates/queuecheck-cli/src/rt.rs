//! Minimal client for the Request Tracker REST 1.0 API.
//!
//! Every RT response body starts with a status line such as
//! `RT/4.4.3 200 Ok`, then a blank line, then the message. The status line
//! says whether RT itself accepted the request, independent of the HTTP
//! status.

use queuecheck_core::config::Credentials;
use queuecheck_core::ticket::RawTicket;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RtError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RT rejected the request: {0}")]
    Status(String),

    #[error("RT returned an empty response")]
    Empty,
}

pub type Result<T> = std::result::Result<T, RtError>;

/// One row of a search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub subject: String,
}

pub struct RtClient {
    base_url: String,
    creds: Credentials,
    http: Client,
}

impl RtClient {
    pub fn new(base_url: &str, creds: Credentials) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            creds,
            http,
        })
    }

    fn post(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "POST");
        let body = self
            .http
            .post(&url)
            .query(query)
            .form(&[("user", &self.creds.user), ("pass", &self.creds.pass)])
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }

    /// Run an RTQL search, newest tickets first.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let body = self.post(
            "search/ticket",
            &[("query", query), ("orderby", "-Created"), ("format", "s")],
        )?;
        Ok(parse_search(&split_response(&body)?))
    }

    pub fn ticket(&self, id: &str) -> Result<RawTicket> {
        let body = self.post(&format!("ticket/{id}"), &[])?;
        Ok(parse_ticket(&split_response(&body)?))
    }

    pub fn history(&self, id: &str) -> Result<String> {
        let body = self.post(&format!("ticket/{id}/history"), &[])?;
        Ok(split_response(&body)?.join("\n"))
    }

    /// Fetch tickets and their histories concurrently, one worker per id.
    /// Both vectors are in the order of `ids`.
    pub fn fetch_batch(&self, ids: &[String]) -> Result<(Vec<RawTicket>, Vec<String>)> {
        let fetched: Vec<Result<(RawTicket, String)>> = std::thread::scope(|scope| {
            let workers: Vec<_> = ids
                .iter()
                .map(|id| {
                    scope.spawn(move || -> Result<(RawTicket, String)> {
                        Ok((self.ticket(id)?, self.history(id)?))
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|w| w.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut tickets = Vec::with_capacity(ids.len());
        let mut histories = Vec::with_capacity(ids.len());
        for result in fetched {
            let (ticket, history) = result?;
            tickets.push(ticket);
            histories.push(history);
        }
        Ok((tickets, histories))
    }
}

/// Check the RT status line and return the message lines: everything after
/// the status line and the blank line that follows it, minus the final
/// empty line.
pub fn split_response(body: &str) -> Result<Vec<&str>> {
    let lines: Vec<&str> = body.split('\n').collect();
    let status = lines.first().copied().unwrap_or_default();
    if status.trim().is_empty() {
        return Err(RtError::Empty);
    }
    if !status.contains("200 Ok") {
        return Err(RtError::Status(status.trim().to_string()));
    }
    if lines.len() < 3 {
        return Ok(Vec::new());
    }
    Ok(lines[2..lines.len() - 1].to_vec())
}

/// Search rows look like `123: Subject text`; the subject may itself
/// contain `": "`.
pub fn parse_search(lines: &[&str]) -> Vec<SearchHit> {
    lines
        .iter()
        .filter_map(|line| line.split_once(": "))
        .map(|(id, subject)| SearchHit {
            id: id.trim().to_string(),
            subject: subject.to_string(),
        })
        .collect()
}

/// Ticket rows look like `Field: value`; rows with an empty field name are
/// dropped.
pub fn parse_ticket(lines: &[&str]) -> RawTicket {
    lines
        .iter()
        .map(|line| line.split_once(": ").unwrap_or((*line, "")))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKET: &str = "RT/4.4.3 200 Ok\n\nid: ticket/42\nQueue: support\nSubject: re: printer: jammed\nStatus: open\nOwner: bob\n: orphan\n\n";

    fn creds() -> Credentials {
        Credentials {
            user: "alice".to_string(),
            pass: "secret".to_string(),
        }
    }

    #[test]
    fn split_response_ok() {
        let lines = split_response(TICKET).unwrap();
        assert_eq!(lines.first(), Some(&"id: ticket/42"));
        assert_eq!(lines.last(), Some(&""));
    }

    #[test]
    fn split_response_rejects_bad_status() {
        let err = split_response("RT/4.4.3 401 Credentials required\n\n").unwrap_err();
        assert!(matches!(err, RtError::Status(ref s) if s.contains("401")));
        assert!(matches!(split_response(""), Err(RtError::Empty)));
    }

    #[test]
    fn parse_ticket_keeps_colons_in_values() {
        let t = parse_ticket(&split_response(TICKET).unwrap());
        assert_eq!(t["id"], "ticket/42");
        assert_eq!(t["Subject"], "re: printer: jammed");
        assert!(!t.contains_key(""));
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn parse_search_rows() {
        let body = "RT/4.4.3 200 Ok\n\n42: printer: jammed\n41: vpn\nNo matching results.\n";
        let hits = parse_search(&split_response(body).unwrap());
        assert_eq!(
            hits,
            vec![
                SearchHit {
                    id: "42".to_string(),
                    subject: "printer: jammed".to_string()
                },
                SearchHit {
                    id: "41".to_string(),
                    subject: "vpn".to_string()
                },
            ]
        );
    }

    #[test]
    fn search_posts_credentials_and_query() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/search/ticket")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("query".into(), "(Queue = \"support\")".into()),
                mockito::Matcher::UrlEncoded("orderby".into(), "-Created".into()),
                mockito::Matcher::UrlEncoded("format".into(), "s".into()),
            ]))
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("user".into(), "alice".into()),
                mockito::Matcher::UrlEncoded("pass".into(), "secret".into()),
            ]))
            .with_body("RT/4.4.3 200 Ok\n\n7: hello\n")
            .create();

        let client = RtClient::new(&format!("{}/", server.url()), creds()).unwrap();
        let hits = client.search("(Queue = \"support\")").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "7");
        mock.assert();
    }

    #[test]
    fn fetch_batch_preserves_order() {
        let mut server = mockito::Server::new();
        let mut mocks = Vec::new();
        for id in ["1", "2", "3"] {
            mocks.push(
                server
                    .mock("POST", format!("/ticket/{id}").as_str())
                    .with_body(format!("RT/4.4.3 200 Ok\n\nid: ticket/{id}\n\n"))
                    .create(),
            );
            mocks.push(
                server
                    .mock("POST", format!("/ticket/{id}/history").as_str())
                    .with_body(format!(
                        "RT/4.4.3 200 Ok\n\n# 1/1 (id/total)\n\n{id}0: Ticket created\n\n"
                    ))
                    .create(),
            );
        }

        let client = RtClient::new(&server.url(), creds()).unwrap();
        let ids: Vec<String> = ["3", "1", "2"].iter().map(|s| s.to_string()).collect();
        let (tickets, histories) = client.fetch_batch(&ids).unwrap();
        let got: Vec<_> = tickets.iter().map(|t| t["id"].as_str()).collect();
        assert_eq!(got, vec!["ticket/3", "ticket/1", "ticket/2"]);
        assert!(histories[0].ends_with("30: Ticket created\n"));
        assert!(histories[2].starts_with("# 1/1"));
    }

    #[test]
    fn rt_level_failure_surfaces() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/ticket/9")
            .with_body("RT/4.4.3 401 Credentials required\n\n")
            .create();
        let client = RtClient::new(&server.url(), creds()).unwrap();
        assert!(matches!(client.ticket("9"), Err(RtError::Status(_))));
    }
}
