use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use mongodb::bson::de::Error as BsonDeError;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::campaign::{CampaignId, CampaignStatus};
use crate::user::UserId;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    CampaignContentRequired,
    RejectionCommentRequired {
        campaign_id: CampaignId,
    },
    ShareEmailRequired,
    InvalidShareEmail {
        email: String,
    },
    ShareRequiresApprovedCampaign {
        campaign_id: CampaignId,
    },
    CannotDeleteSelf,

    // 401
    MissingCredentials,
    InvalidCredentials,

    // 403
    NotCampaignOwner {
        campaign_id: CampaignId,
    },
    AdminRequired,
    SimulationNotApproved,
    SimulationExpired,

    // 404
    PathDoesNotExist,
    CampaignDoesNotExist {
        campaign_id: CampaignId,
    },
    UserDoesNotExist {
        user_id: UserId,
    },
    SimulationDoesNotExist,

    // 409
    TrackingTokenCollision,
    InvalidStatusTransition {
        campaign_id: CampaignId,
        from: CampaignStatus,
        to: CampaignStatus,
    },
    ConcurrentModificationDetected,

    // 500
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    FailedToDeserializeFromBson(#[derivative(PartialEq = "ignore")] BsonDeError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
    MissingConfiguration {
        name: &'static str,
    },
    NotificationFailed {
        reason: String,
    },

    // 503
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    EmailServiceNotConfigured,
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidQuery(_) => "E4001002",
            Error::CampaignContentRequired => "E4001003",
            Error::RejectionCommentRequired { .. } => "E4001004",
            Error::ShareEmailRequired => "E4001005",
            Error::InvalidShareEmail { .. } => "E4001006",
            Error::ShareRequiresApprovedCampaign { .. } => "E4001007",
            Error::CannotDeleteSelf => "E4001008",
            Error::MissingCredentials => "E4011000",
            Error::InvalidCredentials => "E4011001",
            Error::NotCampaignOwner { .. } => "E4031000",
            Error::AdminRequired => "E4031001",
            Error::SimulationNotApproved => "E4031002",
            Error::SimulationExpired => "E4031003",
            Error::PathDoesNotExist => "E4041000",
            Error::CampaignDoesNotExist { .. } => "E4041001",
            Error::UserDoesNotExist { .. } => "E4041002",
            Error::SimulationDoesNotExist => "E4041003",
            Error::TrackingTokenCollision => "E4091000",
            Error::InvalidStatusTransition { .. } => "E4091001",
            Error::ConcurrentModificationDetected => "E4091002",
            Error::FailedToSerializeToBson(_) => "E5001000",
            Error::FailedToDeserializeFromBson(_) => "E5001004",
            Error::IoError(_) => "E5001001",
            Error::MissingConfiguration { .. } => "E5001002",
            Error::NotificationFailed { .. } => "E5001003",
            Error::FailedDatabaseCall(_) => "E5031000",
            Error::EmailServiceNotConfigured => "E5031001",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::CampaignContentRequired => "Title and email text are required",
            Error::RejectionCommentRequired { .. } => "A comment is required for rejection",
            Error::ShareEmailRequired => "A recipient email address is required",
            Error::InvalidShareEmail { .. } => "The recipient email address is not valid",
            Error::ShareRequiresApprovedCampaign { .. } => {
                "Only approved campaigns can be shared"
            }
            Error::CannotDeleteSelf => "An admin cannot delete their own account",
            Error::MissingCredentials => "The request carries no bearer credential",
            Error::InvalidCredentials => "The given bearer credential is not valid",
            Error::NotCampaignOwner { .. } => {
                "The requested campaign belongs to a different user"
            }
            Error::AdminRequired => "The requested operation requires an admin role",
            Error::SimulationNotApproved => "The requested simulation is not approved",
            Error::SimulationExpired => "The requested simulation has expired",
            Error::PathDoesNotExist => "The requested path was not found",
            Error::CampaignDoesNotExist { .. } => "The requested campaign was not found",
            Error::UserDoesNotExist { .. } => "The requested user was not found",
            Error::SimulationDoesNotExist => "The requested simulation was not found",
            Error::TrackingTokenCollision => {
                "A unique tracking token could not be generated"
            }
            Error::InvalidStatusTransition { .. } => {
                "The requested status transition is not allowed"
            }
            Error::ConcurrentModificationDetected => {
                "The server detected a concurrent modification"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::FailedToDeserializeFromBson(_) => {
                "An error occurred when deserializing an object from bson"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
            Error::MissingConfiguration { .. } => {
                "A required configuration value is not set"
            }
            Error::NotificationFailed { .. } => "The notification email could not be sent",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::EmailServiceNotConfigured => "The email service is not configured",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::CampaignContentRequired => StatusCode::BAD_REQUEST,
            Error::RejectionCommentRequired { .. } => StatusCode::BAD_REQUEST,
            Error::ShareEmailRequired => StatusCode::BAD_REQUEST,
            Error::InvalidShareEmail { .. } => StatusCode::BAD_REQUEST,
            Error::ShareRequiresApprovedCampaign { .. } => StatusCode::BAD_REQUEST,
            Error::CannotDeleteSelf => StatusCode::BAD_REQUEST,
            Error::MissingCredentials => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::NotCampaignOwner { .. } => StatusCode::FORBIDDEN,
            Error::AdminRequired => StatusCode::FORBIDDEN,
            Error::SimulationNotApproved => StatusCode::FORBIDDEN,
            Error::SimulationExpired => StatusCode::FORBIDDEN,
            Error::PathDoesNotExist => StatusCode::NOT_FOUND,
            Error::CampaignDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::UserDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::SimulationDoesNotExist => StatusCode::NOT_FOUND,
            Error::TrackingTokenCollision => StatusCode::CONFLICT,
            Error::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            Error::ConcurrentModificationDetected => StatusCode::CONFLICT,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToDeserializeFromBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::MissingConfiguration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotificationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::EmailServiceNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<BsonDeError> for Error {
    fn from(error: BsonDeError) -> Error {
        Error::FailedToDeserializeFromBson(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::FailedToDeserializeFromBson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
