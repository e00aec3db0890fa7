//! Booking agent abstraction.
//!
//! Completing a `book_venue` action item asks an agent for a group
//! reservation. Only a simulated agent is provided.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Reservation;

/// Reservation request for a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub venue_id: Uuid,
    pub venue_name: String,
    pub party_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Booking provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid party size: {0}")]
    InvalidPartySize(usize),
}

#[async_trait::async_trait]
pub trait BookingAgent: Send + Sync {
    async fn reserve(&self, request: ReservationRequest) -> Result<Reservation, BookingError>;
}

/// Simulated booking agent returning `RES-NNNNNN` codes.
pub struct MockBookingAgent {
    rng: Mutex<StdRng>,
    simulate_failure: bool,
}

impl MockBookingAgent {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            simulate_failure: false,
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn failing() -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(0)),
            simulate_failure: true,
        }
    }

    fn next_code(&self) -> Result<String, BookingError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| BookingError::Unavailable("random source poisoned".into()))?;
        Ok(format!("RES-{:06}", rng.gen_range(0..1_000_000)))
    }
}

#[async_trait::async_trait]
impl BookingAgent for MockBookingAgent {
    async fn reserve(&self, request: ReservationRequest) -> Result<Reservation, BookingError> {
        if self.simulate_failure {
            tracing::warn!(venue_id = %request.venue_id, "Mock booking agent simulating failure");
            return Err(BookingError::Unavailable("Simulated failure".into()));
        }
        if request.party_size == 0 {
            return Err(BookingError::InvalidPartySize(0));
        }

        let reservation_code = self.next_code()?;
        tracing::info!(
            venue_id = %request.venue_id,
            party_size = request.party_size,
            reservation_code = %reservation_code,
            "Mock: Would reserve table"
        );

        Ok(Reservation {
            message: format!(
                "Reserved a table for {} at {}",
                request.party_size, request.venue_name
            ),
            reservation_code,
            venue_id: request.venue_id,
            party_size: request.party_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        static ref RESERVATION_CODE: Regex = Regex::new(r"^RES-[0-9]{6}$").unwrap();
    }

    fn request(party_size: usize) -> ReservationRequest {
        ReservationRequest {
            venue_id: Uuid::new_v4(),
            venue_name: "Balthazar".to_string(),
            party_size,
        }
    }

    #[tokio::test]
    async fn test_mock_reservation() {
        let agent = MockBookingAgent::new(StdRng::seed_from_u64(3));
        let reservation = agent.reserve(request(4)).await.unwrap();

        assert!(RESERVATION_CODE.is_match(&reservation.reservation_code));
        assert_eq!(reservation.party_size, 4);
        assert_eq!(reservation.message, "Reserved a table for 4 at Balthazar");
    }

    #[tokio::test]
    async fn test_seeded_agents_agree() {
        let a = MockBookingAgent::new(StdRng::seed_from_u64(9));
        let b = MockBookingAgent::new(StdRng::seed_from_u64(9));
        assert_eq!(
            a.reserve(request(2)).await.unwrap().reservation_code,
            b.reserve(request(2)).await.unwrap().reservation_code
        );
    }

    #[tokio::test]
    async fn test_empty_party_rejected() {
        let agent = MockBookingAgent::from_entropy();
        assert_eq!(
            agent.reserve(request(0)).await,
            Err(BookingError::InvalidPartySize(0))
        );
    }

    #[tokio::test]
    async fn test_failing_agent() {
        let agent = MockBookingAgent::failing();
        assert!(matches!(
            agent.reserve(request(3)).await,
            Err(BookingError::Unavailable(_))
        ));
    }
}
