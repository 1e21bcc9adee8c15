use marquee_core::MovieId;
use marquee_shared::Masked;
use serde::{Deserialize, Deserializer};

use crate::error::{BookingError, InvalidRequest, RequestField};

/// Raw booking request as it arrives from a client. Every field is optional
/// here so that a missing field is reported as such instead of as a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub movie_id: Option<String>,
    pub show_id: Option<String>,
    pub seats: Option<SeatInput>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub email: Option<Masked<String>>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub phone_number: Option<Masked<String>>,
}

/// Contact fields are text, but clients commonly send phone numbers as bare
/// JSON numbers. Those are kept as their decimal text.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextInput {
    Text(String),
    Number(serde_json::Number),
}

fn text_or_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let input = Option::<TextInput>::deserialize(deserializer)?;
    Ok(input.map(|input| match input {
        TextInput::Text(s) => T::from(s),
        TextInput::Number(n) => T::from(n.to_string()),
    }))
}

/// Clients send the seat count either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SeatInput {
    Number(serde_json::Number),
    Text(String),
}

impl SeatInput {
    fn is_blank(&self) -> bool {
        matches!(self, SeatInput::Text(s) if s.trim().is_empty())
    }

    /// Any positive whole number is a valid count here, however large. Whether
    /// that many seats exist is for the booking to decide.
    fn to_count(&self) -> Result<u64, InvalidRequest> {
        let count = match self {
            SeatInput::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole_number)),
            SeatInput::Text(s) => {
                let digits = s.trim();
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
                } else {
                    None
                }
            }
        };

        match count {
            Some(n) if n > 0 => Ok(n),
            _ => Err(InvalidRequest::InvalidSeatCount(self.to_string())),
        }
    }
}

// `3.0` counts as 3; saturates past u64::MAX.
fn whole_number(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then(|| value as u64)
}

impl std::fmt::Display for SeatInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeatInput::Number(n) => write!(f, "{}", n),
            SeatInput::Text(s) => f.write_str(s),
        }
    }
}

/// A booking request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingOrder {
    pub movie_id: MovieId,
    pub show_id: String,
    pub seats: u64,
    pub name: String,
    pub email: Masked<String>,
    pub phone_number: Masked<String>,
}

fn required(value: Option<String>, field: RequestField) -> Result<String, InvalidRequest> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(InvalidRequest::MissingField(field)),
    }
}

impl BookingRequest {
    /// Checks presence of every field, then the seat count, then the movie id.
    /// Nothing here touches the store.
    pub fn validate(self) -> Result<BookingOrder, BookingError> {
        let movie_id = required(self.movie_id, RequestField::MovieId)?;
        let show_id = required(self.show_id, RequestField::ShowId)?;
        let seats = match self.seats {
            Some(seats) if !seats.is_blank() => seats,
            _ => return Err(InvalidRequest::MissingField(RequestField::Seats).into()),
        };
        let name = required(self.name, RequestField::Name)?;
        let email = required(self.email.map(Masked::into_inner), RequestField::Email)?;
        let phone_number = required(
            self.phone_number.map(Masked::into_inner),
            RequestField::PhoneNumber,
        )?;

        let seats = seats.to_count()?;
        let movie_id = MovieId::parse(&movie_id)?;

        Ok(BookingOrder {
            movie_id,
            show_id,
            seats,
            name,
            email: Masked(email),
            phone_number: Masked(phone_number),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> BookingRequest {
        serde_json::from_value(body).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "movieId": "65f1c2a9e4b0a1b2c3d4e5f6",
            "showId": "s1",
            "seats": 3,
            "name": "Alice",
            "email": "a@x.com",
            "phoneNumber": "555"
        })
    }

    #[test]
    fn test_valid_request() {
        let order = request(valid_body()).validate().unwrap();
        assert_eq!(order.movie_id.to_string(), "65f1c2a9e4b0a1b2c3d4e5f6");
        assert_eq!(order.show_id, "s1");
        assert_eq!(order.seats, 3);
        assert_eq!(order.email.expose(), "a@x.com");
    }

    #[test]
    fn test_seat_count_as_string() {
        let mut body = valid_body();
        body["seats"] = json!(" 4 ");
        assert_eq!(request(body).validate().unwrap().seats, 4);
    }

    #[test]
    fn test_missing_fields() {
        for (field, expected) in [
            ("movieId", RequestField::MovieId),
            ("showId", RequestField::ShowId),
            ("seats", RequestField::Seats),
            ("name", RequestField::Name),
            ("email", RequestField::Email),
            ("phoneNumber", RequestField::PhoneNumber),
        ] {
            let mut body = valid_body();
            body.as_object_mut().unwrap().remove(field);
            let err = request(body).validate().unwrap_err();
            assert!(
                matches!(err, BookingError::InvalidRequest(InvalidRequest::MissingField(f)) if f == expected),
                "removing {field} gave {err:?}"
            );
        }

        let mut body = valid_body();
        body["name"] = json!("   ");
        assert!(matches!(
            request(body).validate(),
            Err(BookingError::InvalidRequest(InvalidRequest::MissingField(RequestField::Name)))
        ));
    }

    #[test]
    fn test_invalid_seat_counts() {
        for seats in [json!(0), json!(-2), json!(1.5), json!("abc"), json!("3abc"), json!("0"), json!("-1"), json!("+1")] {
            let mut body = valid_body();
            body["seats"] = seats.clone();
            let err = request(body).validate().unwrap_err();
            assert!(
                matches!(err, BookingError::InvalidRequest(InvalidRequest::InvalidSeatCount(_))),
                "seats {seats} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_large_and_integral_float_counts_are_accepted() {
        for (seats, expected) in [
            (json!("5000000000"), 5_000_000_000),
            (json!(5_000_000_000u64), 5_000_000_000),
            (json!(3.0), 3),
            (json!("99999999999999999999999"), u64::MAX),
        ] {
            let mut body = valid_body();
            body["seats"] = seats.clone();
            assert_eq!(
                request(body).validate().unwrap().seats,
                expected,
                "seats {seats}"
            );
        }
    }

    #[test]
    fn test_numeric_contact_fields() {
        let mut body = valid_body();
        body["phoneNumber"] = json!(5551234);
        body["name"] = json!(42);
        let order = request(body).validate().unwrap();
        assert_eq!(order.phone_number.expose(), "5551234");
        assert_eq!(order.name, "42");

        let mut body = valid_body();
        body["phoneNumber"] = json!(null);
        assert!(matches!(
            request(body).validate(),
            Err(BookingError::InvalidRequest(InvalidRequest::MissingField(
                RequestField::PhoneNumber
            )))
        ));
    }

    #[test]
    fn test_malformed_movie_id() {
        let mut body = valid_body();
        body["movieId"] = json!("not-a-valid-id");
        assert!(matches!(
            request(body).validate(),
            Err(BookingError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_field_checks_run_before_id_check() {
        let mut body = valid_body();
        body["movieId"] = json!("bad");
        body["seats"] = json!("many");
        assert!(matches!(
            request(body).validate(),
            Err(BookingError::InvalidRequest(InvalidRequest::InvalidSeatCount(_)))
        ));
    }
}
