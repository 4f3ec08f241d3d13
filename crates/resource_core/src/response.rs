//! Response builder contract and the default status-code reply.

use crate::model::resource::Record;
use serde::Serialize;

/// Body handed to a response builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Record(Record),
    Collection(Vec<Record>),
}

/// Turns dispatcher results into framework responses.
pub trait ResponseBuilder {
    type Response;

    fn content(&self, body: ResponseBody) -> Self::Response;
    fn created(&self, body: ResponseBody) -> Self::Response;
    fn no_content(&self) -> Self::Response;
}

/// Minimal HTTP response: status code plus optional body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseBody>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the single record body, if any.
    pub fn record(&self) -> Option<&Record> {
        match self.data.as_ref()? {
            ResponseBody::Record(record) => Some(record),
            ResponseBody::Collection(_) => None,
        }
    }

    /// Returns the collection body, if any.
    pub fn collection(&self) -> Option<&[Record]> {
        match self.data.as_ref()? {
            ResponseBody::Collection(records) => Some(records),
            ResponseBody::Record(_) => None,
        }
    }
}

/// Default builder: `200` content, `201` created, `204` no content.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusReply;

impl ResponseBuilder for StatusReply {
    type Response = HttpResponse;

    fn content(&self, body: ResponseBody) -> HttpResponse {
        HttpResponse {
            status: 200,
            data: Some(body),
        }
    }

    fn created(&self, body: ResponseBody) -> HttpResponse {
        HttpResponse {
            status: 201,
            data: Some(body),
        }
    }

    fn no_content(&self) -> HttpResponse {
        HttpResponse {
            status: 204,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ResponseBody, ResponseBuilder, StatusReply};

    #[test]
    fn status_reply_maps_verbs_to_status_codes() {
        let reply = StatusReply;
        assert_eq!(reply.content(ResponseBody::Collection(Vec::new())).status, 200);
        assert_eq!(reply.created(ResponseBody::Collection(Vec::new())).status, 201);

        let empty = reply.no_content();
        assert_eq!(empty.status, 204);
        assert!(empty.data.is_none());
        assert!(empty.is_success());
    }

    #[test]
    fn no_content_serializes_without_data_member() {
        let json = serde_json::to_value(StatusReply.no_content()).expect("serialize");
        assert_eq!(json, serde_json::json!({ "status": 204 }));
    }
}
