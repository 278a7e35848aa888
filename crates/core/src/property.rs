//! Create-property form schema.
//!
//! The rule table for the tenant "create property" form: property details,
//! room types and images. Messages are shown to users verbatim.

use std::sync::LazyLock;

use serde_json::Value;

use crate::error::CoreError;
use crate::validation::{
    validate, FieldSchema, FormSchema, Mode, ValidationResult, ValidationRule,
    ValueType,
};

/// Largest accepted image upload, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 1_000_000;

/// Accepted image MIME subtypes. `gif` is accepted even though the
/// user-facing message only lists png, jpg and jpeg.
pub const ACCEPTED_IMAGE_FORMATS: &[&str] = &["jpg", "jpeg", "png", "gif"];

pub const MIN_PROPERTY_IMAGES: usize = 5;
pub const MAX_PROPERTY_IMAGES: usize = 7;
pub const MIN_ROOM_IMAGES: usize = 3;
pub const MAX_ROOM_IMAGES: usize = 5;

const TEXT_PATTERN: &str = r"[a-zA-Z0-9\s,.'-]*";
const TEXT_MESSAGE: &str =
    "Only letters, numbers, spaces, commas, periods, apostrophes, and hyphens are allowed!";

const ZIP_CODE_PATTERN: &str = "[0-9]{5}";
const PHONE_PATTERN: &str = r"[\+0-9\s]*";

const TIME_MESSAGE: &str = "Invalid time format (HH:MM)";
const URL_MESSAGE: &str = "Invalid URL format";
const FACILITY_MESSAGE: &str = "Room facility must be filled";
const FACILITY_NAME_MESSAGE: &str = "Facility name must be a string";

static CREATE_PROPERTY_SCHEMA: LazyLock<FormSchema> =
    LazyLock::new(|| build_create_property_schema().expect("valid regex"));

/// The compiled create-property schema, built on first use.
pub fn create_property_schema() -> &'static FormSchema {
    &CREATE_PROPERTY_SCHEMA
}

/// Validate a create-property submission.
pub fn validate_property(input: &Value, mode: Mode) -> ValidationResult {
    validate(input, create_property_schema(), mode)
}

/// Build the create-property schema from scratch.
pub fn build_create_property_schema() -> Result<FormSchema, CoreError> {
    Ok(FormSchema::new()
        .field(
            "cityId",
            FieldSchema::required("City is required")
                .rule(ValidationRule::min(1.0, "City must be filled")),
        )
        .field(
            "countryId",
            FieldSchema::required("Country is required")
                .rule(ValidationRule::min(1.0, "Country must be filled")),
        )
        .field(
            "name",
            FieldSchema::required("Property name is required")
                .rule(ValidationRule::pattern(TEXT_PATTERN, TEXT_MESSAGE)?)
                .rule(ValidationRule::min_length(
                    8,
                    "Property name must be at least 8 characters",
                )),
        )
        .field(
            "zipCode",
            FieldSchema::required("Zip code is required").rule(ValidationRule::pattern(
                ZIP_CODE_PATTERN,
                "Zip code must be a 5-digit number",
            )?),
        )
        .field(
            "address",
            FieldSchema::required("Address is required")
                .rule(ValidationRule::pattern(TEXT_PATTERN, TEXT_MESSAGE)?),
        )
        .field(
            "location",
            FieldSchema::required("Location is required").rule(ValidationRule::url(URL_MESSAGE)),
        )
        .field(
            "star",
            FieldSchema::nullable()
                .rule(ValidationRule::max(5.0, "Star rating must be between 1 and 5")),
        )
        .field(
            "checkInStartTime",
            FieldSchema::required("Check-in start time is required")
                .rule(ValidationRule::time(TIME_MESSAGE)),
        )
        .field(
            "checkInEndTime",
            FieldSchema::nullable().rule(ValidationRule::time(TIME_MESSAGE)),
        )
        .field(
            "checkOutStartTime",
            FieldSchema::nullable().rule(ValidationRule::time(TIME_MESSAGE)),
        )
        .field(
            "checkOutEndTime",
            FieldSchema::required("Check-out end time is required")
                .rule(ValidationRule::time(TIME_MESSAGE)),
        )
        .field(
            "propertyTypeId",
            FieldSchema::required("Property type is required")
                .rule(ValidationRule::min(1.0, "Property type must be filled")),
        )
        .field(
            "propertyTypeName",
            FieldSchema::nullable().rule(ValidationRule::pattern(TEXT_PATTERN, TEXT_MESSAGE)?),
        )
        .field(
            "propertyFacilitiesId",
            FieldSchema::nullable()
                .rule(ValidationRule::min_items(
                    1,
                    "At least one facility must be selected",
                ))
                .items(facility_id_schema()),
        )
        .field(
            "propertyFacilitiesName",
            FieldSchema::nullable().items(
                FieldSchema::optional()
                    .rule(ValidationRule::type_check(ValueType::String, FACILITY_NAME_MESSAGE)),
            ),
        )
        .field(
            "propertyImages",
            FieldSchema::optional()
                .rule(ValidationRule::min_items(
                    MIN_PROPERTY_IMAGES,
                    "At least 5 image must be included",
                ))
                .rule(ValidationRule::max_items(
                    MAX_PROPERTY_IMAGES,
                    "Maximum 7 image allowed",
                ))
                .items(image_schema()),
        )
        .field(
            "propertyDescription",
            FieldSchema::required("Property description is required")
                .rule(ValidationRule::pattern(TEXT_PATTERN, TEXT_MESSAGE)?),
        )
        .field(
            "neighborhoodDescription",
            FieldSchema::required("Neighborhood description is required")
                .rule(ValidationRule::pattern(TEXT_PATTERN, TEXT_MESSAGE)?),
        )
        .field(
            "phoneNumber",
            FieldSchema::required("Property phone number is required")
                .rule(ValidationRule::pattern(PHONE_PATTERN, "Invalid phone number")?),
        )
        .field(
            "url",
            FieldSchema::nullable().rule(ValidationRule::url(URL_MESSAGE)),
        )
        .field(
            "totalRooms",
            FieldSchema::required("Total rooms is required")
                .rule(ValidationRule::min(1.0, "Total rooms must be at least 1")),
        )
        .field(
            "propertyRoomTypes",
            FieldSchema::required("Room types are required")
                .rule(ValidationRule::min_items(
                    1,
                    "At least one room type must be defined",
                ))
                .items(FieldSchema::optional().shape(room_type_schema()?)),
        ))
}

/// Schema of one `propertyRoomTypes` element.
fn room_type_schema() -> Result<FormSchema, CoreError> {
    Ok(FormSchema::new()
        .field(
            "name",
            FieldSchema::required("Room type name is required")
                .rule(ValidationRule::pattern(TEXT_PATTERN, TEXT_MESSAGE)?),
        )
        .field(
            "capacity",
            FieldSchema::required("Room capacity is required")
                .rule(ValidationRule::min(1.0, "Room capacity must be at least 1")),
        )
        .field(
            "totalRooms",
            FieldSchema::required("Total rooms is required").rule(ValidationRule::min(
                1.0,
                "Total rooms for this type must be at least 1",
            )),
        )
        .field(
            "price",
            FieldSchema::required("Price is required")
                .rule(ValidationRule::min(1.0, "Price must be filled")),
        )
        .field(
            "rooms",
            FieldSchema::required("Rooms are required")
                .rule(ValidationRule::min(1.0, "Rooms must be at least 1")),
        )
        .field(
            "bathrooms",
            FieldSchema::required("Bathrooms are required")
                .rule(ValidationRule::min(1.0, "Bathrooms must be at least 1")),
        )
        .field(
            "description",
            FieldSchema::required("Room description are required")
                .rule(ValidationRule::pattern(TEXT_PATTERN, TEXT_MESSAGE)?),
        )
        .field(
            "roomFacilities",
            FieldSchema::nullable().items(facility_id_schema()),
        )
        .field(
            "roomImages",
            FieldSchema::optional()
                .rule(ValidationRule::min_items(
                    MIN_ROOM_IMAGES,
                    "At least 3 image must be included",
                ))
                .rule(ValidationRule::max_items(
                    MAX_ROOM_IMAGES,
                    "Maximum 5 image allowed",
                ))
                .items(image_schema()),
        ))
}

fn facility_id_schema() -> FieldSchema {
    FieldSchema::optional().rule(ValidationRule::min(1.0, FACILITY_MESSAGE))
}

/// One uploaded image: `{"size": <bytes>, "type": "<mime>"}`.
fn image_schema() -> FieldSchema {
    FieldSchema::required("Image is required")
        .rule(ValidationRule::max_file_size(
            MAX_IMAGE_BYTES,
            "Maximum 1MB file size allowed",
        ))
        .rule(ValidationRule::file_format(
            ACCEPTED_IMAGE_FORMATS,
            "File format must be png, jpg, or jpeg",
        ))
}
