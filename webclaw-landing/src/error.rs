use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Every way a lead submission can be turned away. The display text is the response body.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LeadError {
    #[error("Missing origin")]
    MissingOrigin,
    #[error("Invalid origin")]
    InvalidOrigin,
    #[error("Forbidden")]
    ForbiddenOrigin,
    #[error("Too many requests")]
    RateLimited,
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Missing work email")]
    MissingEmail,
    #[error("Invalid submission time")]
    InvalidSubmissionTime,
    #[error("Submission expired")]
    Expired,
    #[error("Slack webhook failed")]
    WebhookFailed,
}

impl LeadError {
    pub fn status(&self) -> StatusCode {
        match self {
            LeadError::MissingOrigin | LeadError::InvalidOrigin | LeadError::ForbiddenOrigin => {
                StatusCode::FORBIDDEN
            }
            LeadError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            LeadError::InvalidJson
            | LeadError::MissingEmail
            | LeadError::InvalidSubmissionTime
            | LeadError::Expired => StatusCode::BAD_REQUEST,
            LeadError::WebhookFailed => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for LeadError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(LeadError::MissingOrigin.status(), StatusCode::FORBIDDEN);
        assert_eq!(LeadError::ForbiddenOrigin.status(), StatusCode::FORBIDDEN);
        assert_eq!(LeadError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(LeadError::Expired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(LeadError::WebhookFailed.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(LeadError::Expired.to_string(), "Submission expired");
    }
}
