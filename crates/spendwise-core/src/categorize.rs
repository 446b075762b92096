//! Rule-based category classification
//!
//! Two classifiers share the same first-match-wins shape:
//! - `KeywordClassifier`: plain keyword table over normalized text
//! - `StatementClassifier`: bank-statement aware, reads UPI payee handles
//!   and merchant names before falling back to the whole description

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::models::{Transaction, TransactionKind, DEFAULT_CATEGORY};

/// A category and the substrings that select it
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

impl CategoryRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// First rule with a keyword contained in `text`
fn first_match(rules: &[CategoryRule], text: &str) -> Option<&'static str> {
    rules.iter().find(|r| r.matches(text)).map(|r| r.category)
}

/// Keyword table, in priority order
pub const KEYWORD_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "Food",
        keywords: &[
            "food", "restaurant", "cafe", "zomato", "swiggy", "eat", "pizza", "burger", "lunch",
            "dinner", "breakfast", "kitchen", "dabba", "tiffin", "snack", "grocery", "bigbasket",
            "blinkit",
        ],
    },
    CategoryRule {
        category: "Transport",
        keywords: &[
            "uber", "ola", "taxi", "bus", "metro", "fuel", "petrol", "diesel", "transport", "auto",
            "rapido", "cab", "toll", "parking",
        ],
    },
    CategoryRule {
        category: "Shopping",
        keywords: &[
            "amazon", "flipkart", "shopping", "mall", "store", "mart", "myntra", "ajio", "meesho",
            "nykaa", "purchase", "buy",
        ],
    },
    CategoryRule {
        category: "Entertainment",
        keywords: &[
            "netflix", "movie", "game", "spotify", "prime", "hotstar", "entertainment", "theatre",
            "concert", "youtube", "gaming",
        ],
    },
    CategoryRule {
        category: "Health",
        keywords: &[
            "hospital", "doctor", "medicine", "pharmacy", "health", "medical", "clinic", "chemist",
            "apollo", "diagnostic", "wellness",
        ],
    },
    CategoryRule {
        category: "Rent",
        keywords: &["rent", "landlord", "pg", "hostel", "accommodation", "house", "flat"],
    },
    CategoryRule {
        category: "Utilities",
        keywords: &[
            "electricity", "water", "internet", "phone", "bill", "utility", "broadband",
            "recharge", "postpaid", "jio", "airtel", "bsnl",
        ],
    },
    CategoryRule {
        category: "Education",
        keywords: &[
            "school", "college", "course", "tuition", "education", "udemy", "coursera", "fees",
            "book", "stationery",
        ],
    },
    CategoryRule {
        category: "Travel",
        keywords: &[
            "hotel", "flight", "travel", "trip", "holiday", "irctc", "makemytrip", "goibibo",
            "airbnb", "booking",
        ],
    },
    CategoryRule {
        category: "Salary",
        keywords: &["salary", "stipend", "wage", "payroll", "income", "credit", "deposit"],
    },
    CategoryRule {
        category: "Investment",
        keywords: &[
            "mutual fund", "sip", "stock", "investment", "zerodha", "groww", "nifty", "sensex",
            "crypto", "bitcoin",
        ],
    },
];

/// Keyword classifier over lowercased, punctuation-stripped text
#[derive(Debug, Clone, Copy)]
pub struct KeywordClassifier {
    rules: &'static [CategoryRule],
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self {
            rules: KEYWORD_RULES,
        }
    }

    pub fn classify(&self, description: &str) -> &'static str {
        first_match(self.rules, &normalize(description)).unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn classify_all<S: AsRef<str>>(&self, descriptions: &[S]) -> Vec<&'static str> {
        descriptions
            .iter()
            .map(|d| self.classify(d.as_ref()))
            .collect()
    }

    /// Fill in categories that are still the default
    ///
    /// Returns how many transactions got a new category.
    pub fn classify_uncategorized(&self, transactions: &mut [Transaction]) -> usize {
        let mut changed = 0;
        for tx in transactions
            .iter_mut()
            .filter(|t| t.category == DEFAULT_CATEGORY)
        {
            let category = self.classify(&tx.description);
            if category != DEFAULT_CATEGORY {
                tx.category = category.to_string();
                changed += 1;
            }
        }
        debug!(changed, total = transactions.len(), "Classified uncategorized transactions");
        changed
    }
}

/// Lowercase and replace anything outside `[a-z0-9 ]` with a space
fn normalize(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Payee handle table (matched against the part after the last slash of a UPI line)
pub const UPI_HANDLE_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "Food",
        keywords: &[
            "zomato", "swiggy", "foodpanda", "dunzo", "blinkit.food", "eatfit", "freshmenu",
            "faasos", "boxncow", "rebel.food", "eatsure",
        ],
    },
    CategoryRule {
        category: "Shopping",
        keywords: &[
            "amazon", "flipkart", "myntra", "meesho", "ajio", "nykaa", "snapdeal", "shopsy",
            "tatacliq", "firstcry", "bigbasket", "jiomart", "blinkit", "zepto", "instamart",
            "grofers", "dmart", "reliance",
        ],
    },
    CategoryRule {
        category: "Transport",
        keywords: &[
            "uber", "ola", "rapido", "yulu", "bounce", "drivezy", "blowhorn", "porter", "metroemo",
            "metro", "irctc", "redbus", "abhibus", "makemytrip.transport",
        ],
    },
    CategoryRule {
        category: "Entertainment",
        keywords: &[
            "netflix", "spotify", "hotstar", "primevideo", "sonyliv", "zee5", "jiocinema",
            "bookmyshow", "paytminsider", "youtube", "gaana", "jiosaavn", "hungama", "mxplayer",
            "voot", "alt.balaji",
        ],
    },
    CategoryRule {
        category: "Health",
        keywords: &[
            "apollo", "pharmeasy", "netmeds", "tata1mg", "1mg", "medlife", "docsapp", "practo",
            "lybrate", "healthians", "thyrocare", "portea", "cult.fit", "curefit",
        ],
    },
    CategoryRule {
        category: "Utilities",
        keywords: &[
            "airtel", "jio", "vodafone", "bsnl", "payair", "vi.pay", "bescom", "msedcl", "bses",
            "tpddl", "cesc", "adanielectricity", "tatapower", "mahadiscom", "torrentpower",
            "paytm.utility", "billdesk", "bajajfinserv.emi",
        ],
    },
    CategoryRule {
        category: "Investment",
        keywords: &[
            "groww", "zerodha", "upstox", "angelone", "angelbroking", "icicidirect", "hdfcsec",
            "kotaksec", "sbisec", "motilal", "nuvama", "paytmmoney", "kuvera", "coin.zerodha",
            "mfcentral", "camsonline", "nsdl", "cdsl", "npscra",
        ],
    },
    CategoryRule {
        category: "Travel",
        keywords: &[
            "makemytrip", "goibibo", "yatra", "cleartrip", "ixigo", "airasia", "indigo",
            "spicejet", "airindia", "vistara", "akasaair", "oyo", "treebo", "fabhotels", "zostel",
            "airbnb",
        ],
    },
    CategoryRule {
        category: "Education",
        keywords: &[
            "udemy", "coursera", "byjus", "unacademy", "vedantu", "whitehatjr", "toppr",
            "extramarks", "meritnation", "simplilearn", "scaler", "upgrad", "lpu", "twc",
            "college", "university", "school", "fees",
        ],
    },
    CategoryRule {
        category: "Rent",
        keywords: &[
            "nobroker", "magicbricks", "housing.com", "nestaway", "stanza", "colive", "rent",
            "landlord", "pg.pay", "commonfloor",
        ],
    },
];

/// Merchant-name table, used on the parsed payee and then on the whole line
pub const MERCHANT_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "Food",
        keywords: &[
            "zomato", "swiggy", "food", "foods", "kitchen", "kitchn", "cafe", "restaurant",
            "hotel", "dhaba", "biryani", "pizza", "burger", "chai", "chaivyan", "nk food",
            "shiva fo", "belgian", "belg", "juice", "bakery", "sweet", "canteen", "mess", "tiffin",
            "dabba",
        ],
    },
    CategoryRule {
        category: "Shopping",
        keywords: &[
            "amazon", "flipkart", "myntra", "meesho", "ajio", "nykaa", "shopping", "mart", "store",
            "shop", "market", "bazar", "bazaar", "retail", "dmart", "reliance", "bigbasket",
            "grocer", "grocery", "kirana", "vegetables", "fruits",
        ],
    },
    CategoryRule {
        category: "Transport",
        keywords: &[
            "uber", "ola", "rapido", "metro", "metroemo", "bus", "auto", "taxi", "cab", "travel",
            "transport", "petrol", "fuel", "pump", "irctc", "railway", "train", "flight",
            "airline", "redbus", "porter",
        ],
    },
    CategoryRule {
        category: "Entertainment",
        keywords: &[
            "netflix", "spotify", "prime", "hotstar", "bookmyshow", "cinema", "movie", "theatre",
            "gaming", "game", "play", "entertainment", "music", "show",
        ],
    },
    CategoryRule {
        category: "Health",
        keywords: &[
            "apollo", "pharma", "pharmacy", "medical", "medicine", "doctor", "hospital", "clinic",
            "health", "diagnostic", "lab", "test", "fitness", "gym", "cult", "yoga", "chemist",
            "drug",
        ],
    },
    CategoryRule {
        category: "Utilities",
        keywords: &[
            "airtel", "jio", "vodafone", "bsnl", "electricity", "electric", "power", "bill",
            "recharge", "broadband", "internet", "water", "gas", "utility", "bescom", "msedcl",
            "tatapower", "wifi",
        ],
    },
    CategoryRule {
        category: "Investment",
        keywords: &[
            "groww", "zerodha", "upstox", "angel", "invest", "sip", "mutual fund", "stock",
            "share", "demat", "nps", "ppf", "fd", "fixed deposit", "insurance", "lic",
            "hdfc life", "icici pru",
        ],
    },
    CategoryRule {
        category: "Travel",
        keywords: &[
            "hotel", "oyo", "treebo", "airbnb", "flight", "indigo", "spicejet", "makemytrip",
            "goibibo", "yatra", "cleartrip", "ixigo", "resort", "lodge", "hostel", "booking",
        ],
    },
    CategoryRule {
        category: "Education",
        keywords: &[
            "lpu", "university", "college", "school", "udemy", "coursera", "byjus", "unacademy",
            "coaching", "tuition", "classes", "education", "course", "fees", "admission", "twc",
        ],
    },
    CategoryRule {
        category: "Rent",
        keywords: &[
            "rent", "landlord", "house rent", "pg rent", "room rent", "flat rent",
            "accommodation",
        ],
    },
    CategoryRule {
        category: "Salary",
        keywords: &[
            "salary", "stipend", "income", "bonus", "payroll", "nfsi", "imps-in", "neft-in",
            "neft_in", "credit",
        ],
    },
    CategoryRule {
        category: "Other",
        keywords: &["atm", "cash withdrawal", "wdr", "withdraw"],
    },
];

/// Income lines, checked in order; anything else incoming is salary
const INCOME_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "Salary",
        keywords: &["salary", "stipend", "payroll"],
    },
    CategoryRule {
        category: "Investment",
        keywords: &["groww", "zerodha", "upstox", "mutual", "nps"],
    },
    CategoryRule {
        category: "Other",
        keywords: &["refund", "cashback", "reversal"],
    },
];

const UPI_PATTERN: &str = r"(?i)UPI/(DR|CR)/\d+/([^/]+)/[^/]+/([^\s,/]+)";
const INBOUND_PATTERN: &str = r"(?i)IMPS-IN|NEFT_IN|NEFT-IN";

/// Money direction printed on a UPI line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpiDirection {
    Debit,
    Credit,
}

/// The parts of a statement line the classifier looks at
///
/// `direction` and `inbound_transfer` are informational for callers of
/// [`StatementClassifier::parse`]; `classify` takes the money direction from
/// its `kind` argument instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    /// Lowercased payee name, or the whole line when it is not UPI
    pub merchant: String,
    /// Lowercased UPI handle (e.g. `zomato@ybl`)
    pub upi_handle: Option<String>,
    pub direction: Option<UpiDirection>,
    /// IMPS/NEFT inbound transfer marker present
    pub inbound_transfer: bool,
}

/// Statement-aware classifier for Indian bank exports
#[derive(Debug, Clone)]
pub struct StatementClassifier {
    upi: Regex,
    inbound: Regex,
}

impl StatementClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            upi: Regex::new(UPI_PATTERN)?,
            inbound: Regex::new(INBOUND_PATTERN)?,
        })
    }

    /// Split a description of the form `UPI/DR/<txn>/<merchant>/<bank>/<handle>`
    pub fn parse(&self, description: &str) -> StatementLine {
        let desc = description.trim();

        if let Some(caps) = self.upi.captures(desc) {
            let direction = if caps[1].eq_ignore_ascii_case("CR") {
                UpiDirection::Credit
            } else {
                UpiDirection::Debit
            };
            return StatementLine {
                merchant: caps[2].trim().to_lowercase(),
                upi_handle: Some(caps[3].trim().to_lowercase()),
                direction: Some(direction),
                inbound_transfer: false,
            };
        }

        StatementLine {
            merchant: desc.to_lowercase(),
            upi_handle: None,
            direction: None,
            inbound_transfer: self.inbound.is_match(desc),
        }
    }

    /// Category for one statement line
    ///
    /// `kind` of `Income` short-circuits to the income rules.
    pub fn classify(&self, description: &str, kind: Option<TransactionKind>) -> &'static str {
        if description.trim().is_empty() {
            return DEFAULT_CATEGORY;
        }

        let desc = description.to_lowercase();

        if kind == Some(TransactionKind::Income) {
            return first_match(INCOME_RULES, &desc).unwrap_or("Salary");
        }

        let line = self.parse(description);

        if let Some(handle) = line.upi_handle.as_deref() {
            if let Some(category) = first_match(UPI_HANDLE_RULES, handle) {
                return category;
            }
        }

        if !line.merchant.is_empty() {
            if let Some(category) = first_match(MERCHANT_RULES, &line.merchant) {
                return category;
            }
        }

        first_match(MERCHANT_RULES, &desc).unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn classify_all<S: AsRef<str>>(
        &self,
        descriptions: &[S],
        kind: Option<TransactionKind>,
    ) -> Vec<&'static str> {
        descriptions
            .iter()
            .map(|d| self.classify(d.as_ref(), kind))
            .collect()
    }
}
