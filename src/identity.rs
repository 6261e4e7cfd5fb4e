use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::user::{Role, UserId};

/// The authenticated caller, as vouched for by the identity provider. The
/// anonymous simulation path never constructs one of these.
#[derive(Clone, Copy, Debug)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn require_admin(&self) -> Result<(), Error> {
        match self.role {
            Role::Admin => Ok(()),
            Role::User => Err(Error::AdminRequired),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    sub: String,
    role: Role,
    exp: usize,
}

/// Verifies bearer tokens minted by the external auth service. Issuance
/// (login, OTP) happens elsewhere; this side only needs the shared secret.
pub struct IdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityProvider {
    pub fn new(secret: &str) -> IdentityProvider {
        IdentityProvider {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn authenticate(&self, bearer: &str) -> Result<Identity, Error> {
        let data = decode::<Claims>(bearer, &self.decoding_key, &self.validation)
            .map_err(|_| Error::InvalidCredentials)?;
        let user_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| Error::InvalidCredentials)?;

        Ok(Identity {
            user_id,
            role: data.claims.role,
        })
    }
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Identity, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate_request(req))
    }
}

fn authenticate_request(req: &HttpRequest) -> Result<Identity, Error> {
    let provider = req
        .app_data::<Data<IdentityProvider>>()
        .ok_or(Error::MissingConfiguration {
            name: "IdentityProvider",
        })?;

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(Error::MissingCredentials)?
        .to_str()
        .map_err(|_| Error::InvalidCredentials)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(Error::MissingCredentials)?;

    provider.authenticate(token)
}
