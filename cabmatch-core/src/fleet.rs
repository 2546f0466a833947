//! Cabs and ride requests taking part in a single optimisation run.
//!
//! Both entities are plain tagged records: an identifier plus a typed
//! attribute block. The order of the fleet and request lists defines the row
//! and column order of the cost matrix, but lookups between lists always go
//! through identifiers.

use std::fmt;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ValidationError;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

identifier!(
    /// Identifier of a cab in the fleet.
    CabId
);

identifier!(
    /// Identifier of a ride request.
    RiderId
);

/// Corridor a cab operates on or a rider asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct RouteId(pub u32);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route-{}", self.0)
    }
}

/// Behavioural attributes of a cab.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CabAttributes {
    /// Corridor the cab is currently serving.
    pub route: RouteId,
    /// Customer rating; never negative.
    pub rating: f64,
    /// Passengers already on board.
    pub occupancy: u32,
}

/// A cab available for assignment.
///
/// # Examples
/// ```
/// use cabmatch_core::{Cab, CabAttributes, RouteId};
///
/// # fn main() -> Result<(), cabmatch_core::ValidationError> {
/// let cab = Cab::new(
///     "cab0",
///     CabAttributes { route: RouteId(0), rating: 4.4, occupancy: 1 },
/// )?;
/// assert_eq!(cab.id.as_str(), "cab0");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cab {
    /// Unique identifier within the fleet.
    pub id: CabId,
    /// Attributes captured when the snapshot was taken.
    pub attributes: CabAttributes,
}

impl Cab {
    /// Validate and construct a [`Cab`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRating`] when the rating is negative
    /// or not finite.
    pub fn new(id: impl Into<CabId>, attributes: CabAttributes) -> Result<Self, ValidationError> {
        let cab = Self {
            id: id.into(),
            attributes,
        };
        cab.validate()?;
        Ok(cab)
    }

    /// Re-check invariants, e.g. after deserialisation.
    ///
    /// # Errors
    ///
    /// See [`Cab::new`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        let rating = self.attributes.rating;
        if rating.is_finite() && rating >= 0.0 {
            Ok(())
        } else {
            Err(ValidationError::InvalidRating {
                cab: self.id.clone(),
                rating,
            })
        }
    }
}

/// Trip attributes of a ride request.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. They are
/// carried for callers and routing collaborators; the cost model only reads
/// `distance`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RiderAttributes {
    /// Pickup location.
    pub source: Coord<f64>,
    /// Drop-off location.
    pub destination: Coord<f64>,
    /// Trip length in distance units; never negative.
    pub distance: f64,
    /// Requested corridor.
    pub route: RouteId,
}

/// A ride request awaiting a cab.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use cabmatch_core::{Rider, RiderAttributes, RouteId};
///
/// let attributes = RiderAttributes {
///     source: Coord { x: 78.01, y: 27.2046 },
///     destination: Coord { x: 50.477_644, y: 28.196_93 },
///     distance: 10.0,
///     route: RouteId(0),
/// };
/// assert!(Rider::new("rider0", attributes.clone()).is_ok());
///
/// let negative = RiderAttributes { distance: -1.0, ..attributes };
/// assert!(Rider::new("rider0", negative).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rider {
    /// Unique identifier within the request batch.
    pub id: RiderId,
    /// Trip attributes.
    pub attributes: RiderAttributes,
}

impl Rider {
    /// Validate and construct a [`Rider`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDistance`] when the trip distance is
    /// negative or not finite.
    pub fn new(
        id: impl Into<RiderId>,
        attributes: RiderAttributes,
    ) -> Result<Self, ValidationError> {
        let rider = Self {
            id: id.into(),
            attributes,
        };
        rider.validate()?;
        Ok(rider)
    }

    /// Re-check invariants, e.g. after deserialisation.
    ///
    /// # Errors
    ///
    /// See [`Rider::new`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        let distance = self.attributes.distance;
        if distance.is_finite() && distance >= 0.0 {
            Ok(())
        } else {
            Err(ValidationError::InvalidDistance {
                rider: self.id.clone(),
                distance,
            })
        }
    }
}
