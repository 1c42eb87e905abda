pub mod compensation;
pub mod location;
pub mod offer;
pub mod shift;
pub mod user;

pub use compensation::{Availability, Compensation, CompensationKind};
pub use location::{LocationOptions, LocationsLastUpdated};
pub use offer::{
    Offer, OfferDecision, OfferStatus, PickupShiftInput, PickupShiftResponse, RespondToOfferInput,
    RespondToOfferResult,
};
pub use shift::{
    DeleteShiftInput, DeleteShiftResponse, OfferedShiftRefs, SaveShiftResponse, Shift,
    ShiftMutationResponse, ShiftStatus, NO_SELECTION,
};
pub use user::{DeleteAccountInput, NewAccount, SuccessResponse, UserRef};
