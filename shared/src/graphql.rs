//! GraphQL documents, request envelopes and response decoding for the
//! Hasura gateway.

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::create_form::CreateCenterInput;
use crate::error::FetchError;
use crate::model::{Center, CreatedCenter, Region, RegionId, UserId, Woreda, Zone, ZoneId};
use crate::session::{Password, SignInOutcome};

pub const REGIONS: &str = "query REGIONS { base_regions { id name } }";

pub const GET_ZONES: &str =
    "query GET_ZONES($where: base_zone_bool_exp) { base_zone(where: $where) { id name } }";

pub const GET_WOREDA: &str =
    "query GET_WOREDA($where: base_woreda_bool_exp) { base_woreda(where: $where) { id name } }";

pub const GET_CENTERS: &str =
    "query GetBaseOSSC { base_ossc { name region { name zones { name } } created_at } }";

pub const SIGN_IN: &str = "mutation SignIn($password: String!, $phoneNumber: String!) { \
     signIn(password: $password, phoneNumber: $phoneNumber) { \
     data { id email } tokens { access_token refresh_token } } }";

pub const CREATE_CENTER: &str = "mutation CreateOSSC($object: base_ossc_insert_input!) { \
     insert_base_ossc_one(object: $object) { id name } }";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Regions,
    Zones,
    Woredas,
    Centers,
    SignIn,
    CreateCenter,
}

impl Operation {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Regions => "REGIONS",
            Self::Zones => "GET_ZONES",
            Self::Woredas => "GET_WOREDA",
            Self::Centers => "GetBaseOSSC",
            Self::SignIn => "SignIn",
            Self::CreateCenter => "CreateOSSC",
        }
    }

    #[must_use]
    pub const fn document(self) -> &'static str {
        match self {
            Self::Regions => REGIONS,
            Self::Zones => GET_ZONES,
            Self::Woredas => GET_WOREDA,
            Self::Centers => GET_CENTERS,
            Self::SignIn => SIGN_IN,
            Self::CreateCenter => CREATE_CENTER,
        }
    }

    /// Sign-in is the only operation sent without a bearer token.
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        !matches!(self, Self::SignIn)
    }
}

/// Request body. Variables may hold the password, so no `Debug`.
#[derive(Serialize, Clone)]
pub struct GraphQlRequest {
    #[serde(skip)]
    pub operation: Operation,
    pub query: &'static str,
    #[serde(rename = "operationName")]
    pub operation_name: &'static str,
    pub variables: Value,
}

impl GraphQlRequest {
    fn new(operation: Operation, variables: Value) -> Self {
        Self {
            operation,
            query: operation.document(),
            operation_name: operation.name(),
            variables,
        }
    }

    #[must_use]
    pub fn regions() -> Self {
        Self::new(Operation::Regions, json!({}))
    }

    #[must_use]
    pub fn zones(region_id: &RegionId) -> Self {
        Self::new(
            Operation::Zones,
            json!({ "where": { "region_id": { "_eq": region_id } } }),
        )
    }

    #[must_use]
    pub fn woredas(zone_id: &ZoneId) -> Self {
        Self::new(
            Operation::Woredas,
            json!({ "where": { "zone_id": { "_eq": zone_id } } }),
        )
    }

    #[must_use]
    pub fn centers() -> Self {
        Self::new(Operation::Centers, json!({}))
    }

    #[must_use]
    pub fn sign_in(phone_number: &str, password: &Password) -> Self {
        Self::new(
            Operation::SignIn,
            json!({ "phoneNumber": phone_number.trim(), "password": password.expose() }),
        )
    }

    #[must_use]
    pub fn create_center(input: &CreateCenterInput) -> Self {
        Self::new(Operation::CreateCenter, json!({ "object": input }))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FetchError> {
        serde_json::to_vec(self).map_err(|e| FetchError::Request {
            reason: e.to_string(),
        })
    }
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize, Debug)]
struct GraphQlErrorEntry {
    message: String,
}

/// Typed `data` member of a response, and how it maps to the caller's value.
pub trait Payload: DeserializeOwned {
    type Output;

    fn into_output(self) -> Result<Self::Output, FetchError>;
}

/// Failure on non-2xx status, unparseable body, any `errors` entry, or
/// missing `data`. In that order.
pub fn decode<P: Payload>(status: u16, body: &[u8]) -> Result<P::Output, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Status { status });
    }
    let response: GraphQlResponse<P> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode {
            reason: e.to_string(),
        })?;
    if !response.errors.is_empty() {
        return Err(FetchError::GraphQl {
            messages: response.errors.into_iter().map(|e| e.message).collect(),
        });
    }
    response.data.ok_or(FetchError::MissingData)?.into_output()
}

#[derive(Deserialize, Debug)]
pub struct RegionsData {
    base_regions: Vec<Region>,
}

impl Payload for RegionsData {
    type Output = Vec<Region>;

    fn into_output(self) -> Result<Vec<Region>, FetchError> {
        Ok(self.base_regions)
    }
}

#[derive(Deserialize, Debug)]
pub struct ZonesData {
    base_zone: Vec<Zone>,
}

impl Payload for ZonesData {
    type Output = Vec<Zone>;

    fn into_output(self) -> Result<Vec<Zone>, FetchError> {
        Ok(self.base_zone)
    }
}

#[derive(Deserialize, Debug)]
pub struct WoredasData {
    base_woreda: Vec<Woreda>,
}

impl Payload for WoredasData {
    type Output = Vec<Woreda>;

    fn into_output(self) -> Result<Vec<Woreda>, FetchError> {
        Ok(self.base_woreda)
    }
}

#[derive(Deserialize, Debug)]
pub struct CentersData {
    base_ossc: Vec<Center>,
}

impl Payload for CentersData {
    type Output = Vec<Center>;

    fn into_output(self) -> Result<Vec<Center>, FetchError> {
        Ok(self.base_ossc)
    }
}

#[derive(Deserialize, Debug)]
pub struct SignInData {
    #[serde(rename = "signIn")]
    sign_in: Option<SignInPayload>,
}

#[derive(Deserialize, Debug)]
struct SignInPayload {
    data: SignInUser,
    tokens: SignInTokens,
}

#[derive(Deserialize, Debug)]
struct SignInUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize, Debug)]
struct SignInTokens {
    access_token: SecretString,
    refresh_token: SecretString,
}

impl Payload for SignInData {
    type Output = SignInOutcome;

    fn into_output(self) -> Result<SignInOutcome, FetchError> {
        let payload = self.sign_in.ok_or(FetchError::MissingData)?;
        Ok(SignInOutcome {
            user_id: payload.data.id,
            email: payload.data.email.unwrap_or_default(),
            access_token: payload.tokens.access_token,
            refresh_token: payload.tokens.refresh_token,
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct InsertCenterData {
    insert_base_ossc_one: Option<CreatedCenter>,
}

impl Payload for InsertCenterData {
    type Output = CreatedCenter;

    fn into_output(self) -> Result<CreatedCenter, FetchError> {
        self.insert_base_ossc_one.ok_or(FetchError::MissingData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CenterId, WoredaId};
    use secrecy::ExposeSecret;

    #[test]
    fn zone_request_filters_on_region() {
        let request = GraphQlRequest::zones(&RegionId::new(1));
        let body: Value = serde_json::from_slice(&request.to_bytes().unwrap()).unwrap();
        assert_eq!(body["operationName"], "GET_ZONES");
        assert_eq!(body["variables"]["where"]["region_id"]["_eq"], 1);
        assert!(body["query"].as_str().unwrap().contains("base_zone(where: $where)"));
    }

    #[test]
    fn text_ids_are_echoed_as_strings() {
        let request = GraphQlRequest::woredas(&ZoneId::new("z-9"));
        assert_eq!(request.variables["where"]["zone_id"]["_eq"], "z-9");
    }

    #[test]
    fn create_center_object_fields() {
        let input = CreateCenterInput {
            name: "Bole OSSC".into(),
            description: "Main office".into(),
            house_number: "12".into(),
            phone_number: "0911000000".into(),
            zone_id: ZoneId::new(10),
            woreda_id: WoredaId::new(100),
        };
        let request = GraphQlRequest::create_center(&input);
        let object = &request.variables["object"];
        assert_eq!(object["name"], "Bole OSSC");
        assert_eq!(object["house_number"], "12");
        assert_eq!(object["phone_number"], "0911000000");
        assert_eq!(object["zone_id"], 10);
        assert_eq!(object["woreda_id"], 100);
        assert_eq!(request.operation_name, "CreateOSSC");
    }

    #[test]
    fn decodes_regions() {
        let body = br#"{"data":{"base_regions":[{"id":1,"name":"Addis"},{"id":"2","name":"Oromia"}]}}"#;
        let regions = decode::<RegionsData>(200, body).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].id, RegionId::new("2"));
    }

    #[test]
    fn empty_collection_is_ok() {
        let zones = decode::<ZonesData>(200, br#"{"data":{"base_zone":[]}}"#).unwrap();
        assert!(zones.is_empty());
    }

    #[test]
    fn failure_conditions() {
        assert_eq!(
            decode::<RegionsData>(502, b"bad gateway").unwrap_err(),
            FetchError::Status { status: 502 }
        );
        assert!(matches!(
            decode::<RegionsData>(200, b"<html>").unwrap_err(),
            FetchError::Decode { .. }
        ));
        assert_eq!(
            decode::<RegionsData>(
                200,
                br#"{"data":null,"errors":[{"message":"field 'base_regions' not found"}]}"#
            )
            .unwrap_err(),
            FetchError::GraphQl {
                messages: vec!["field 'base_regions' not found".into()]
            }
        );
        assert_eq!(
            decode::<RegionsData>(200, br#"{}"#).unwrap_err(),
            FetchError::MissingData
        );
    }

    #[test]
    fn decodes_centers_with_timestamps() {
        let body = br#"{"data":{"base_ossc":[
            {"name":"Bole","region":{"name":"Addis Ababa","zones":[{"name":"Z1"}]},"created_at":"2024-09-12T08:31:22.123456+00:00"}
        ]}}"#;
        let centers = decode::<CentersData>(200, body).unwrap();
        assert_eq!(centers[0].created_date(), "9/12/2024");
        assert_eq!(centers[0].zone_names(), "Z1");
    }

    #[test]
    fn decodes_sign_in() {
        let body = br#"{"data":{"signIn":{"data":{"id":"u-1","email":"a@b.c"},"tokens":{"access_token":"at","refresh_token":"rt"}}}}"#;
        let outcome = decode::<SignInData>(200, body).unwrap();
        assert_eq!(outcome.user_id, UserId::new("u-1"));
        assert_eq!(outcome.email, "a@b.c");
        assert_eq!(outcome.access_token.expose_secret(), "at");
        assert!(matches!(
            decode::<SignInData>(200, br#"{"data":{"signIn":null}}"#),
            Err(FetchError::MissingData)
        ));
    }

    #[test]
    fn decodes_created_center() {
        let body = br#"{"data":{"insert_base_ossc_one":{"id":42,"name":"Bole OSSC"}}}"#;
        let created = decode::<InsertCenterData>(200, body).unwrap();
        assert_eq!(created.id, CenterId::new(42));
    }

    #[test]
    fn sign_in_variables() {
        let request = GraphQlRequest::sign_in(" 0911 ", &Password::new("pw"));
        assert_eq!(request.variables["phoneNumber"], "0911");
        assert_eq!(request.variables["password"], "pw");
        assert!(!request.operation.requires_auth());
    }
}
