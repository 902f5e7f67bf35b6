use serde::{Deserialize, Serialize};

/// Message intent, as assigned by the LLM classifier (C8) or a prefilter
/// forced/skipped synthetic result (C7).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Intent {
    Request,
    Offer,
    Recommendation,
    Complaint,
    Info,
    Other,
}

impl Intent {
    pub fn code(self) -> i32 {
        match self {
            Intent::Request => 1,
            Intent::Offer => 2,
            Intent::Recommendation => 3,
            Intent::Complaint => 4,
            Intent::Info => 5,
            Intent::Other => 6,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => Intent::Request,
            2 => Intent::Offer,
            3 => Intent::Recommendation,
            4 => Intent::Complaint,
            5 => Intent::Info,
            6 => Intent::Other,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Request => "REQUEST",
            Intent::Offer => "OFFER",
            Intent::Recommendation => "RECOMMENDATION",
            Intent::Complaint => "COMPLAINT",
            Intent::Info => "INFO",
            Intent::Other => "OTHER",
        }
    }
}

/// Top-level message domain (§3). `None_` is the sentinel for "no domain".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Domain {
    ConstructionAndRepair,
    RentalOfRealEstate,
    PurchaseOfRealEstate,
    RealEstateAgent,
    Law,
    Services,
    Auto,
    Marketplace,
    SocialCapital,
    OperationalManagement,
    Reputation,
    None_,
}

impl Domain {
    pub fn code(self) -> i32 {
        match self {
            Domain::ConstructionAndRepair => 1,
            Domain::RentalOfRealEstate => 2,
            Domain::PurchaseOfRealEstate => 3,
            Domain::RealEstateAgent => 4,
            Domain::Law => 5,
            Domain::Services => 6,
            Domain::Auto => 7,
            Domain::Marketplace => 8,
            Domain::SocialCapital => 9,
            Domain::OperationalManagement => 10,
            Domain::Reputation => 11,
            Domain::None_ => 12,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => Domain::ConstructionAndRepair,
            2 => Domain::RentalOfRealEstate,
            3 => Domain::PurchaseOfRealEstate,
            4 => Domain::RealEstateAgent,
            5 => Domain::Law,
            6 => Domain::Services,
            7 => Domain::Auto,
            8 => Domain::Marketplace,
            9 => Domain::SocialCapital,
            10 => Domain::OperationalManagement,
            11 => Domain::Reputation,
            12 => Domain::None_,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::ConstructionAndRepair => "CONSTRUCTION_AND_REPAIR",
            Domain::RentalOfRealEstate => "RENTAL_OF_REAL_ESTATE",
            Domain::PurchaseOfRealEstate => "PURCHASE_OF_REAL_ESTATE",
            Domain::RealEstateAgent => "REAL_ESTATE_AGENT",
            Domain::Law => "LAW",
            Domain::Services => "SERVICES",
            Domain::Auto => "AUTO",
            Domain::Marketplace => "MARKETPLACE",
            Domain::SocialCapital => "SOCIAL_CAPITAL",
            Domain::OperationalManagement => "OPERATIONAL_MANAGEMENT",
            Domain::Reputation => "REPUTATION",
            Domain::None_ => "NONE",
        }
    }

    /// Subcategory code → name table for this domain. Empty for `None_`.
    pub fn subcategories(self) -> &'static [(i32, &'static str)] {
        match self {
            Domain::ConstructionAndRepair => &[
                (1, "MAJOR_RENOVATION"),
                (2, "REPAIR_SERVICES"),
                (3, "SMALL_TOOLS_AND_MATERIALS"),
            ],
            Domain::RentalOfRealEstate => &[
                (1, "RENTAL_APARTMENT"),
                (2, "RENTAL_HOUSE"),
                (3, "RENTAL_PARKING"),
                (4, "RENTAL_STORAGE"),
                (5, "RENTAL_LAND"),
            ],
            Domain::PurchaseOfRealEstate => &[
                (1, "PURCHASE_APARTMENT"),
                (2, "PURCHASE_HOUSE"),
                (3, "PURCHASE_PARKING"),
                (4, "PURCHASE_STORAGE"),
                (5, "PURCHASE_LAND"),
            ],
            Domain::RealEstateAgent => &[(1, "AGENT")],
            Domain::Law => &[(1, "LAWYER")],
            Domain::Services => &[
                (1, "BEAUTY_AND_HEALTH"),
                (2, "HOUSEHOLD_SERVICES"),
                (3, "CHILD_CARE_AND_EDUCATION"),
                (4, "DELIVERY_SERVICES"),
                (5, "TECH_REPAIR"),
            ],
            Domain::Auto => &[
                (1, "AUTO_PURCHASE"),
                (2, "AUTO_PREMIUM_DETAILING"),
                (3, "AUTO_REPAIR"),
                (4, "AUTO_SERVICE_STATION"),
            ],
            Domain::Marketplace => &[
                (1, "BUY_SELL_GOODS"),
                (2, "GIVE_AWAY"),
                (3, "HOMEMADE_FOOD"),
                (4, "BUYER_SERVICES"),
            ],
            Domain::SocialCapital => &[
                (1, "PARENTING"),
                (2, "HOBBY_AND_SPORT"),
                (3, "EVENTS"),
            ],
            Domain::OperationalManagement => &[
                (1, "LOST_AND_FOUND"),
                (2, "SECURITY"),
                (3, "LIVING_ENVIRONMENT"),
                (4, "MANAGEMENT_COMPANY_INTERACTION"),
            ],
            Domain::Reputation => &[(1, "PERSONAL_BRAND"), (2, "COMPANIES_REPUTATION")],
            Domain::None_ => &[],
        }
    }

    pub fn subcategory_name(self, sub_code: i32) -> Option<&'static str> {
        self.subcategories()
            .iter()
            .find(|(code, _)| *code == sub_code)
            .map(|(_, name)| *name)
    }

    pub fn all() -> [Domain; 12] {
        [
            Domain::ConstructionAndRepair,
            Domain::RentalOfRealEstate,
            Domain::PurchaseOfRealEstate,
            Domain::RealEstateAgent,
            Domain::Law,
            Domain::Services,
            Domain::Auto,
            Domain::Marketplace,
            Domain::SocialCapital,
            Domain::OperationalManagement,
            Domain::Reputation,
            Domain::None_,
        ]
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|d| d.as_str() == s)
    }
}
