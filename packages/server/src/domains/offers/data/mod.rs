pub mod offer_view;
pub mod types;

pub use offer_view::{
    HousingComplexData, ImageData, MetroStationData, OfferStats, OfferView, PricePoint,
    PromotionInfo, SellerData,
};
pub use types::{
    CreateOfferInput, PromotionPurchase, PromotionTariff, ToggleResult, UpdateOfferInput,
    UpstreamPolicy, Viewer,
};
