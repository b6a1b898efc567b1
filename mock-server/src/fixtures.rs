//! Canned search data served by the mock endpoint.
//!
//! Three queries are known: the fully populated `clark.kent@example.com`
//! record, the `brianperks@gmail.com` match (also reachable through its md5),
//! and the broad `brian perks` name search, which yields possible persons
//! whose search pointers resolve back through `person_for_pointer`.

use serde_json::{json, Value};

pub const CLARK_EMAIL: &str = "clark.kent@example.com";
pub const CLARK_ID: &str = "0d4d6a5e-4c2b-4a57-9d33-8d1b2f0c7e11";

pub const BRIAN_EMAIL: &str = "brianperks@gmail.com";
/// Address shown in place of every email to the contact and social classes.
pub const MASKED_EMAIL: &str = "full.email.available@professional.or.premium.subscription";

pub const BRIAN_EMAIL_MD5: &str = "e34996fda036d60aa2a595ca86ed8fef";
pub const BRIAN_ID: &str = "7f3c2a10-8e5b-4d61-b0a4-2c9e6d1f5a37";
const OTHER_ID: &str = "c1a9e4d2-3f70-4b8e-a615-9d0e2b7c4f58";

/// (person id, search pointer, match score, city, state)
const CANDIDATES: &[(&str, &str, f64, &str, &str)] = &[
    (
        "9b1e0c4a-5d2f-4e7a-8c36-1f0a9b2d3e41",
        "3f8a1c9e7b2d4e60a5c1f9e8d7b6a5c4e3f2a1b0",
        0.92,
        "San Francisco",
        "CA",
    ),
    (
        "4e2d7a1b-9c3f-4b05-a8e6-7d1c0f9b2a53",
        "a7c2e9f1b3d5c8e0f4a6b2d9c1e7f3a5b8d0c6e2",
        0.78,
        "Austin",
        "TX",
    ),
    (
        "e6b0f3c9-1a2d-4c78-9e5b-3a4f7d2c1b60",
        "5d1b8e3a9f7c2e6d0b4a8f1c3e5d7b9a2c6f0e84",
        0.55,
        "Portland",
        "OR",
    ),
    (
        "2a7f9d0e-6b1c-4e3a-b5d8-0c9f4a1e7b26",
        "c9e4a2f7d1b6e3c8a0f5d2b9e7c1a4f6d8b3e0a5",
        0.31,
        "Columbus",
        "OH",
    ),
];

pub fn clark_kent() -> Value {
    json!({
        "@id": CLARK_ID,
        "@match": 1.0,
        "names": [
            {"@valid_since": "2000-01-01", "first": "Clark", "middle": "Joseph", "last": "Kent", "display": "Clark Joseph Kent"},
            {"@type": "alias", "first": "Kal", "last": "El", "display": "Kal El"}
        ],
        "emails": [
            {"@valid_since": "2005-06-12", "@email_provider": false, "address": CLARK_EMAIL, "address_md5": "2610ee49440fe757e4a0b3d6a2fc8bb3"},
            {"@type": "work", "@email_provider": false, "address": "clark.kent@dailyplanet.example.com", "address_md5": "999e509752141a0ee42ff455529c10fc"}
        ],
        "usernames": [
            {"content": "superman@facebook"},
            {"content": "clarkkent"}
        ],
        "user_ids": [
            {"content": "11231@facebook"}
        ],
        "phones": [
            {"@type": "home_phone", "country_code": 1, "number": 9785550145u64, "display": "978-555-0145", "display_international": "+1 978-555-0145"}
        ],
        "addresses": [
            {"country": "US", "state": "KS", "city": "Smallville", "street": "Hickory Lane", "house": "10", "zip_code": "66605", "display": "10 Hickory Lane, Smallville, Kansas"},
            {"@type": "work", "country": "US", "state": "KS", "city": "Metropolis", "street": "Broadway", "house": "1000", "apartment": "355", "display": "1000-355 Broadway, Metropolis, Kansas"}
        ],
        "jobs": [
            {"title": "Field Reporter", "organization": "The Daily Planet", "industry": "Journalism", "date_range": {"start": "2000-12-08", "end": "2012-10-09"}, "display": "Field Reporter at The Daily Planet (2000-2012)"}
        ],
        "educations": [
            {"degree": "B.Sc Advanced Science", "school": "Metropolis University", "date_range": {"start": "2005-09-01", "end": "2008-05-14"}, "display": "B.Sc Advanced Science from Metropolis University (2005-2008)"}
        ],
        "images": [
            {"url": "https://images.example.com/clark-kent.jpg", "thumbnail_token": "AE2861B242686E7BD0CB4D9049298EB7D18FEF66D950E8AB78BCD3F484345CE74536C19A85D0BA3D32DC9E7D1878CD4D341254E7AD129255C6983E6E154C4530A0DAAF665EA325FC0206F8B1D7E0B6B7AD9EBF71FCF610D57D"}
        ],
        "urls": [
            {"@source_id": "1144a5f8d24d4d58cd9f1a8f4a2d4f4c", "@domain": "linkedin.com", "@name": "LinkedIn", "@category": "professional_and_business", "url": "https://www.linkedin.com/pub/superman/20/7a/365"},
            {"@source_id": "b9f4a1c2d3e5f6a7b8c9d0e1f2a3b4c5", "@domain": "facebook.com", "@name": "Facebook", "@category": "personal_profiles", "url": "https://www.facebook.com/superman"}
        ],
        "dob": {"date_range": {"start": "1986-05-15", "end": "1986-05-15"}, "display": "40 years old"},
        "gender": {"content": "male"},
        "languages": [
            {"language": "en", "region": "US", "display": "en_US"}
        ],
        "origin_countries": [
            {"country": "US"}
        ],
        "relationships": [
            {"@type": "family", "@subtype": "Father", "names": [{"first": "Jonathan", "last": "Kent", "display": "Jonathan Kent"}]},
            {"@type": "friend", "names": [{"first": "Lois", "last": "Lane", "display": "Lois Lane"}]}
        ]
    })
}

pub fn clark_kent_sources() -> Vec<Value> {
    vec![
        json!({
            "@id": "1144a5f8d24d4d58cd9f1a8f4a2d4f4c",
            "@person_id": CLARK_ID,
            "@category": "professional_and_business",
            "@match": 1.0,
            "@valid_since": "2008-04-03",
            "name": "LinkedIn",
            "domain": "linkedin.com",
            "names": [{"first": "Clark", "last": "Kent", "display": "Clark Kent"}],
            "jobs": [{"title": "Field Reporter", "organization": "The Daily Planet", "display": "Field Reporter at The Daily Planet"}]
        }),
        json!({
            "@id": "d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9",
            "@person_id": OTHER_ID,
            "@category": "personal_profiles",
            "@match": 0.4,
            "name": "Facebook",
            "domain": "facebook.com",
            "names": [{"first": "Clark", "last": "Kent", "display": "Clark Kent"}],
            "addresses": [{"country": "US", "state": "NY", "city": "New York", "display": "New York, New York"}]
        }),
    ]
}

pub fn brian_perks() -> Value {
    json!({
        "@id": BRIAN_ID,
        "@match": 1.0,
        "names": [
            {"first": "Brian", "last": "Perks", "display": "Brian Perks"}
        ],
        "emails": [
            {"@email_provider": true, "address": BRIAN_EMAIL, "address_md5": BRIAN_EMAIL_MD5}
        ],
        "jobs": [
            {"title": "Software Engineer", "organization": "Acme Corp", "date_range": {"start": "2014-02-01", "end": "2020-11-30"}, "display": "Software Engineer at Acme Corp (2014-2020)"}
        ],
        "addresses": [
            {"@inferred": true, "country": "US", "state": "CA", "city": "San Francisco", "display": "San Francisco, California"}
        ],
        "urls": [
            {"@source_id": "e7f8a9b0c1d2e3f4a5b6c7d8e9f0a1b2", "@domain": "linkedin.com", "@name": "LinkedIn", "@category": "professional_and_business", "url": "https://www.linkedin.com/in/brianperks"},
            {"@source_id": "f0e1d2c3b4a5968778695a4b3c2d1e0f", "@domain": "peoplelookup.example.com", "@name": "People Lookup", "@category": "background_reports", "@sponsored": true, "url": "https://peoplelookup.example.com/brian-perks"}
        ],
        "gender": {"@inferred": true, "content": "male"},
        "dob": {"@inferred": true, "date_range": {"start": "1980-01-01", "end": "1989-12-31"}, "display": "36-46 years old"},
        "languages": [
            {"@inferred": true, "language": "en", "display": "en"}
        ]
    })
}

pub fn brian_perks_sources() -> Vec<Value> {
    vec![
        json!({
            "@id": "e7f8a9b0c1d2e3f4a5b6c7d8e9f0a1b2",
            "@person_id": BRIAN_ID,
            "@category": "professional_and_business",
            "@match": 1.0,
            "name": "LinkedIn",
            "domain": "linkedin.com",
            "@origin_url": "https://www.linkedin.com/in/brianperks",
            "names": [{"first": "Brian", "last": "Perks", "display": "Brian Perks"}]
        }),
        json!({
            "@id": "f0e1d2c3b4a5968778695a4b3c2d1e0f",
            "@person_id": BRIAN_ID,
            "@category": "background_reports",
            "@sponsored": true,
            "@match": 1.0,
            "name": "People Lookup",
            "domain": "peoplelookup.example.com",
            "names": [{"first": "Brian", "last": "Perks", "display": "Brian Perks"}]
        }),
        json!({
            "@id": "a0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5",
            "@person_id": OTHER_ID,
            "@category": "personal_profiles",
            "@match": 0.35,
            "name": "Twitter",
            "domain": "twitter.com",
            "names": [{"first": "Bryan", "last": "Perks", "display": "Bryan Perks"}]
        }),
    ]
}

fn candidate(id: &str, pointer: Option<&str>, score: f64, city: &str, state: &str) -> Value {
    let mut person = json!({
        "@id": id,
        "@match": score,
        "names": [{"first": "Brian", "last": "Perks", "display": "Brian Perks"}],
        "addresses": [{"country": "US", "state": state, "city": city, "display": format!("{city}, {state}")}]
    });
    if let Some(pointer) = pointer {
        person["@search_pointer"] = Value::String(pointer.to_string());
    }
    person
}

/// Possible persons for the broad `brian perks` name search.
pub fn brian_perks_candidates() -> Vec<Value> {
    CANDIDATES
        .iter()
        .map(|(id, pointer, score, city, state)| candidate(id, Some(pointer), *score, city, state))
        .collect()
}

/// The full record behind a search pointer from `brian_perks_candidates`.
pub fn person_for_pointer(pointer: &str) -> Option<Value> {
    CANDIDATES
        .iter()
        .find(|(_, p, ..)| *p == pointer)
        .map(|(id, _, _, city, state)| {
            let mut person = candidate(id, None, 1.0, city, state);
            person["jobs"] = json!([{"title": "Engineer", "display": "Engineer"}]);
            person
        })
}

/// A field kind the client does not model, returned with `show_unknown_fields`.
pub fn unknown_field() -> Value {
    json!([{"@valid_since": "2015-03-01", "make": "Ford", "model": "Pickup", "year": 1959}])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_candidate_pointer_resolves() {
        for candidate in brian_perks_candidates() {
            let pointer = candidate["@search_pointer"].as_str().unwrap();
            let person = person_for_pointer(pointer).unwrap();
            assert_eq!(person["@id"], candidate["@id"]);
            assert!(person.get("@search_pointer").is_none());
        }
        assert!(person_for_pointer("unknown").is_none());
    }

    #[test]
    fn brian_perks_has_inferred_and_sponsored_data() {
        let person = brian_perks();
        assert_eq!(person["addresses"][0]["@inferred"], true);
        assert_eq!(person["urls"][1]["@sponsored"], true);
    }

    #[test]
    fn clark_kent_phone_keeps_full_number() {
        let person = clark_kent();
        assert_eq!(person["phones"][0]["number"].as_u64(), Some(9785550145));
        assert_eq!(person["phones"][0]["country_code"], 1);
    }
}
