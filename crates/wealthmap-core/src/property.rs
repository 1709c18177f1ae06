//! Property entity and derived read-time fields

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Fallback image shown when a property has no uploaded photo
pub const PROPERTY_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/300x200?text=No+Image";

/// Fallback portrait shown when an owner has no uploaded photo
pub const OWNER_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/150x150?text=No+Image";

/// Unique identifier for a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub Uuid);

impl PropertyId {
    /// Create a new random property ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a property ID from a string
    ///
    /// A malformed id is a client-input error, not a lookup miss.
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| StoreError::Validation(format!("Invalid property ID format: {s}")))
    }
}

impl Default for PropertyId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        }
    }

    /// Parse from the stored text representation
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Male" => Ok(Sex::Male),
            "Female" => Ok(Sex::Female),
            "Other" => Ok(Sex::Other),
            _ => Err(StoreError::Validation(format!("Invalid sex: {s}"))),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Income tier derived from monthly income
///
/// Never persisted; computed at the serialization boundary as a pure step
/// function of `monthlyIncome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeTier {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl IncomeTier {
    /// Classify a monthly income into its tier
    pub fn from_monthly_income(income: f64) -> Self {
        if income < 5000.0 {
            IncomeTier::Low
        } else if income < 10000.0 {
            IncomeTier::Medium
        } else if income < 20000.0 {
            IncomeTier::High
        } else {
            IncomeTier::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeTier::Low => "Low",
            IncomeTier::Medium => "Medium",
            IncomeTier::High => "High",
            IncomeTier::VeryHigh => "Very High",
        }
    }
}

impl std::fmt::Display for IncomeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Street address of a property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Address {
    /// Single-line rendering used for the `formattedAddress` derived field
    pub fn formatted(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street, self.city, self.state, self.zip_code
        )
    }
}

/// Geographic point (WGS 84 longitude/latitude)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Financial and demographic details of a property owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerDetails {
    pub owner_name: String,
    pub age: u32,
    pub sex: Sex,
    pub email: String,
    pub mobile_number: String,
    pub occupation: String,
    pub monthly_income: f64,
    pub total_wealth: f64,
    pub owner_image: String,
}

/// A property listing with owner metadata and geolocation
///
/// Read-only from the query engine's perspective: created by the
/// administration path, never partially updated, deleted administratively
/// (which cascades to dependent bookmarks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Unique identifier, assigned by the store on creation
    pub id: PropertyId,
    pub name: String,
    pub address: Address,
    pub location: GeoPoint,
    pub property_image: String,
    pub owner_details: OwnerDetails,
    /// Creation timestamp, immutable, default sort key
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Create a new property with a fresh id and timestamp
    ///
    /// Empty image fields fall back to the documented placeholders.
    pub fn new(
        name: String,
        address: Address,
        location: GeoPoint,
        property_image: Option<String>,
        mut owner_details: OwnerDetails,
    ) -> Self {
        if owner_details.owner_image.is_empty() {
            owner_details.owner_image = OWNER_IMAGE_PLACEHOLDER.to_string();
        }
        Self {
            id: PropertyId::new(),
            name,
            address,
            location,
            property_image: property_image
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| PROPERTY_IMAGE_PLACEHOLDER.to_string()),
            owner_details,
            created_at: Utc::now(),
        }
    }

    /// Validate required fields and numeric ranges before insertion
    pub fn validate(&self) -> Result<()> {
        fn required(field: &str, value: &str) -> Result<()> {
            if value.trim().is_empty() {
                return Err(StoreError::Validation(format!("{field} is required")));
            }
            Ok(())
        }

        required("name", &self.name)?;
        required("address.street", &self.address.street)?;
        required("address.city", &self.address.city)?;
        required("address.state", &self.address.state)?;
        required("address.zipCode", &self.address.zip_code)?;
        required("ownerDetails.ownerName", &self.owner_details.owner_name)?;
        required("ownerDetails.email", &self.owner_details.email)?;
        required("ownerDetails.mobileNumber", &self.owner_details.mobile_number)?;
        required("ownerDetails.occupation", &self.owner_details.occupation)?;

        if self.owner_details.age == 0 {
            return Err(StoreError::Validation(
                "ownerDetails.age must be positive".to_string(),
            ));
        }
        if !(self.owner_details.monthly_income >= 0.0) {
            return Err(StoreError::Validation(
                "ownerDetails.monthlyIncome must be non-negative".to_string(),
            ));
        }
        if !(self.owner_details.total_wealth >= 0.0) {
            return Err(StoreError::Validation(
                "ownerDetails.totalWealth must be non-negative".to_string(),
            ));
        }
        if !self.location.longitude.is_finite()
            || !(-180.0..=180.0).contains(&self.location.longitude)
        {
            return Err(StoreError::Validation(
                "location.longitude out of range".to_string(),
            ));
        }
        if !self.location.latitude.is_finite() || !(-90.0..=90.0).contains(&self.location.latitude)
        {
            return Err(StoreError::Validation(
                "location.latitude out of range".to_string(),
            ));
        }
        Ok(())
    }

    /// Derived income tier of the owner
    pub fn income_tier(&self) -> IncomeTier {
        IncomeTier::from_monthly_income(self.owner_details.monthly_income)
    }

    /// Derived single-line address
    pub fn formatted_address(&self) -> String {
        self.address.formatted()
    }
}
