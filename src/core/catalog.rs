//! Compiled-in taxonomy data.
//!
//! These tables are the fallback whenever the key-value cache document is
//! missing or unreadable. The cache document can override domain rules, the
//! default industry and packs, but industry profiles (patterns, keywords,
//! schema types) are only defined here.

use crate::domain::model::IntentPack;
use std::collections::BTreeMap;

pub const DEFAULT_INDUSTRY: &str = "generic";

/// Key under which the rule/pack document lives in the key-value store.
pub const PACKS_DOCUMENT_KEY: &str = "industry_packs_json";

pub struct IndustryProfile {
    pub key: &'static str,
    /// Regexes matched against lower-cased signal text.
    pub patterns: &'static [&'static str],
    /// Any of these in the text vetoes a pattern vote for this industry.
    pub anti_keywords: &'static [&'static str],
    /// Substrings matched against domain tokens.
    pub domain_keywords: &'static [&'static str],
    /// schema.org `@type` values expected on a site of this industry.
    pub schema_types: &'static [&'static str],
}

pub const INDUSTRY_PROFILES: &[IndustryProfile] = &[
    IndustryProfile {
        key: "automotive.oem",
        patterns: &[
            r"\b(vehicles?|suvs?|sedans?|trucks?|hybrids?|minivans?)\b",
            r"\b(msrp|test drive|build (and|&) price)\b",
            r"\bdealers?\b",
            r"\b(towing|horsepower|mpg|drivetrain)\b",
        ],
        anti_keywords: &["used car inventory", "pre-owned inventory"],
        domain_keywords: &[
            "toyota", "honda", "ford", "chevrolet", "nissan", "subaru", "hyundai", "kia",
            "mazda", "lexus", "bmw", "audi", "tesla", "volkswagen", "motors",
        ],
        schema_types: &["Car", "Vehicle", "AutomotiveBusiness", "Brand"],
    },
    IndustryProfile {
        key: "automotive.dealership",
        patterns: &[
            r"\b(used cars?|pre-owned|certified pre-owned)\b",
            r"\b(trade-in|inventory)\b",
            r"\bdealership\b",
            r"\b(service center|oil change)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["autos", "carmax", "autonation", "dealer", "cars"],
        schema_types: &["AutoDealer", "AutoRepair", "AutomotiveBusiness"],
    },
    IndustryProfile {
        key: "healthcare.hospital",
        patterns: &[
            r"\b(hospitals?|medical center|clinics?)\b",
            r"\b(patient portal|patients)\b",
            r"\b(emergency|urgent care)\b",
            r"\b(physicians?|doctors?|surgeons?)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["hospital", "clinic", "medical", "health", "mayo"],
        schema_types: &["Hospital", "MedicalOrganization", "MedicalClinic", "Physician"],
    },
    IndustryProfile {
        key: "healthcare.pharmaceutical",
        patterns: &[
            r"\b(pharmaceuticals?|pharma)\b",
            r"\b(prescription|prescribing information)\b",
            r"\b(clinical trials?|fda)\b",
            r"\b(drugs?|medications?|dosage)\b",
        ],
        anti_keywords: &["patient portal", "find a doctor", "emergency room", "visiting hours"],
        domain_keywords: &["pharma", "pfizer", "merck", "novartis", "sanofi", "lilly", "drug"],
        schema_types: &["Drug", "MedicalOrganization", "Corporation"],
    },
    IndustryProfile {
        key: "retail.ecommerce",
        patterns: &[
            r"\b(shop|store)\b",
            r"\b(add to cart|cart|checkout)\b",
            r"\b(free shipping|shipping)\b",
            r"\b(returns?|return policy)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["shop", "store", "mart", "outlet", "amazon", "etsy", "ebay"],
        schema_types: &["Product", "Offer", "Store", "OnlineStore"],
    },
    IndustryProfile {
        key: "software.saas",
        patterns: &[
            r"\b(saas|software|platform)\b",
            r"\b(free trial|sign up|request a demo)\b",
            r"\b(api|integrations?)\b",
            r"\b(dashboard|workflows?|automation)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["software", "cloud", "saas", "labs", "stack", "salesforce", "slack"],
        schema_types: &["SoftwareApplication", "WebApplication"],
    },
    IndustryProfile {
        key: "finance.banking",
        patterns: &[
            r"\b(bank|banking)\b",
            r"\b(checking|savings) accounts?\b",
            r"\b(mortgages?|loans?)\b",
            r"\b(credit cards?|debit cards?)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["bank", "chase", "credit", "savings", "financial", "capitalone"],
        schema_types: &["BankOrCreditUnion", "FinancialService", "FinancialProduct"],
    },
    IndustryProfile {
        key: "finance.insurance",
        patterns: &[
            r"\binsurance\b",
            r"\b(get a quote|premiums?|coverage)\b",
            r"\b(claims?|deductibles?)\b",
            r"\b(auto|home|life) insurance\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["insurance", "insure", "geico", "allstate", "progressive", "assurance"],
        schema_types: &["InsuranceAgency", "FinancialProduct"],
    },
    IndustryProfile {
        key: "travel.hospitality",
        patterns: &[
            r"\b(hotels?|resorts?)\b",
            r"\b(book now|booking|reservations?)\b",
            r"\b(rooms?|suites?)\b",
            r"\b(check-in|amenities)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["hotel", "resort", "marriott", "hilton", "hyatt", "travel", "inn"],
        schema_types: &["Hotel", "LodgingBusiness", "Resort"],
    },
    IndustryProfile {
        key: "education.higher_ed",
        patterns: &[
            r"\b(university|college)\b",
            r"\b(admissions?|apply now)\b",
            r"\b(students?|faculty|campus)\b",
            r"\b(degrees?|undergraduate|graduate programs?)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["university", "college", "edu", "academy"],
        schema_types: &["CollegeOrUniversity", "EducationalOrganization"],
    },
    IndustryProfile {
        key: "media.publishing",
        patterns: &[
            r"\b(news|breaking)\b",
            r"\b(subscribe|newsletter)\b",
            r"\b(articles?|opinion|editorial)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["news", "times", "herald", "tribune", "journal", "gazette"],
        schema_types: &["NewsArticle", "NewsMediaOrganization", "Article"],
    },
    IndustryProfile {
        key: "food.restaurant",
        patterns: &[
            r"\b(restaurants?|menu)\b",
            r"\b(order online|delivery|takeout)\b",
            r"\b(dine-in|reservations?)\b",
        ],
        anti_keywords: &[],
        domain_keywords: &["pizza", "burger", "grill", "kitchen", "cafe", "restaurant", "bistro"],
        schema_types: &["Restaurant", "FoodEstablishment", "Menu"],
    },
    IndustryProfile {
        key: DEFAULT_INDUSTRY,
        patterns: &[],
        anti_keywords: &[],
        domain_keywords: &[],
        schema_types: &["Organization"],
    },
];

/// Flat keys from older audits mapped to their hierarchical form.
pub const LEGACY_KEYS: &[(&str, &str)] = &[
    ("automotive_oem", "automotive.oem"),
    ("auto_oem", "automotive.oem"),
    ("automotive_dealer", "automotive.dealership"),
    ("auto_dealer", "automotive.dealership"),
    ("dealership", "automotive.dealership"),
    ("hospital", "healthcare.hospital"),
    ("healthcare_provider", "healthcare.hospital"),
    ("pharma", "healthcare.pharmaceutical"),
    ("pharmaceutical", "healthcare.pharmaceutical"),
    ("ecommerce", "retail.ecommerce"),
    ("retail_ecommerce", "retail.ecommerce"),
    ("saas", "software.saas"),
    ("software", "software.saas"),
    ("bank", "finance.banking"),
    ("banking", "finance.banking"),
    ("insurance", "finance.insurance"),
    ("hotel", "travel.hospitality"),
    ("hospitality", "travel.hospitality"),
    ("university", "education.higher_ed"),
    ("higher_ed", "education.higher_ed"),
    ("news", "media.publishing"),
    ("publisher", "media.publishing"),
    ("restaurant", "food.restaurant"),
    ("general", DEFAULT_INDUSTRY),
    ("other", DEFAULT_INDUSTRY),
    ("unknown", DEFAULT_INDUSTRY),
];

pub const DEFAULT_DOMAIN_RULES: &[(&str, &str)] = &[
    ("toyota.com", "automotive.oem"),
    ("honda.com", "automotive.oem"),
    ("ford.com", "automotive.oem"),
    ("carmax.com", "automotive.dealership"),
    ("mayoclinic.org", "healthcare.hospital"),
    ("pfizer.com", "healthcare.pharmaceutical"),
    ("amazon.com", "retail.ecommerce"),
    ("salesforce.com", "software.saas"),
    ("chase.com", "finance.banking"),
    ("geico.com", "finance.insurance"),
    ("marriott.com", "travel.hospitality"),
    ("mit.edu", "education.higher_ed"),
    ("nytimes.com", "media.publishing"),
];

fn pack(allow: &[&str], deny: &[&str], inherits: &[&str]) -> IntentPack {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    IntentPack {
        allow_tags: owned(allow),
        deny_phrases: (!deny.is_empty()).then(|| owned(deny)),
        inherits: (!inherits.is_empty()).then(|| owned(inherits)),
    }
}

const RETAIL_DENY: &[&str] = &[
    "return policy",
    "shipping",
    "gift card",
    "promo code",
    "cart",
    "checkout",
    "coupon",
];

pub fn default_packs() -> BTreeMap<String, IntentPack> {
    let mut packs = BTreeMap::new();
    packs.insert(
        "automotive".to_string(),
        pack(
            &["vehicles", "models", "maintenance", "parts", "reviews", "safety_ratings", "fuel_economy"],
            &[],
            &[],
        ),
    );
    packs.insert(
        "automotive.oem".to_string(),
        pack(
            &["pricing", "msrp", "dealers", "dealer_locator", "towing_capacity", "trims", "financing", "comparisons", "warranty"],
            RETAIL_DENY,
            &["automotive"],
        ),
    );
    packs.insert(
        "automotive.dealership".to_string(),
        pack(
            &["inventory", "used_cars", "trade_in", "financing", "service_appointments"],
            &["gift card", "promo code"],
            &["automotive"],
        ),
    );
    packs.insert(
        "healthcare".to_string(),
        pack(&["symptoms", "treatment", "locations", "insurance_accepted"], &["coupon", "promo code"], &[]),
    );
    packs.insert(
        "healthcare.hospital".to_string(),
        pack(
            &["find_a_doctor", "appointments", "emergency", "patient_portal", "visiting_hours"],
            &[],
            &["healthcare"],
        ),
    );
    packs.insert(
        "healthcare.pharmaceutical".to_string(),
        pack(
            &["side_effects", "dosage", "clinical_trials", "prescribing_information", "savings_program"],
            &["near me"],
            &["healthcare"],
        ),
    );
    packs.insert("retail".to_string(), pack(&[], &[], &[]));
    packs.insert(
        "retail.ecommerce".to_string(),
        pack(
            &["pricing", "shipping", "returns", "discounts", "product_reviews", "availability"],
            &[],
            &["retail"],
        ),
    );
    packs.insert(
        "software.saas".to_string(),
        pack(
            &["pricing", "integrations", "features", "api", "security", "alternatives", "comparisons"],
            &["near me", "gift card"],
            &[],
        ),
    );
    packs.insert("finance".to_string(), pack(&["rates", "fees", "security"], &[], &[]));
    packs.insert(
        "finance.banking".to_string(),
        pack(&["checking", "savings", "mortgage", "credit_cards", "branch_locator"], &[], &["finance"]),
    );
    packs.insert(
        "finance.insurance".to_string(),
        pack(&["quotes", "coverage", "claims", "discounts"], &[], &["finance"]),
    );
    packs.insert(
        "travel.hospitality".to_string(),
        pack(&["rooms", "rates", "amenities", "locations", "reservations", "loyalty_program"], &[], &[]),
    );
    packs.insert(
        "education.higher_ed".to_string(),
        pack(
            &["admissions", "tuition", "programs", "campus", "financial_aid", "rankings"],
            &["free shipping", "cart"],
            &[],
        ),
    );
    packs.insert(
        "media.publishing".to_string(),
        pack(&["subscription", "news", "newsletter", "archives"], &[], &[]),
    );
    packs.insert(
        "food.restaurant".to_string(),
        pack(&["menu", "hours", "locations", "delivery", "reservations", "pricing"], &[], &[]),
    );
    packs.insert(DEFAULT_INDUSTRY.to_string(), pack(&[], &[], &[]));
    packs
}
