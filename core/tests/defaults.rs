//! Process-wide defaults. Kept in its own test binary because
//! `config::set_defaults` can only succeed once per process.

use pipl_core::config::{self, ClientConfig};
use pipl_core::{SearchClient, SearchCriteria, SearchRequest};

#[test]
fn defaults_supply_key_and_base_url() {
    let defaults = ClientConfig::new("http://defaults.example.com/").with_api_key("default-key");
    config::set_defaults(defaults.clone()).unwrap();
    assert_eq!(config::defaults(), Some(&ClientConfig::new("http://defaults.example.com").with_api_key("default-key")));

    // second call is rejected and hands the config back
    let rejected = config::set_defaults(ClientConfig::default()).unwrap_err();
    assert_eq!(rejected, ClientConfig::default());

    let request = SearchRequest::from_criteria(SearchCriteria {
        email: Some("clark.kent@example.com".to_string()),
        ..Default::default()
    });

    let req = SearchClient::from_defaults().build_search(&request).unwrap();
    assert!(req.url.starts_with("http://defaults.example.com/search/?key=default-key"));

    // a client without its own key falls back to the default key
    let client = SearchClient::new(ClientConfig::new("http://other.example.com"));
    let req = client.build_search(&request).unwrap();
    assert_eq!(req.url, "http://other.example.com/search/?key=default-key");

    // the client key wins over the default, the request key over both
    let client = SearchClient::new(ClientConfig::new("http://other.example.com").with_api_key("client-key"));
    let req = client.build_search(&request).unwrap();
    assert!(req.url.ends_with("key=client-key"));
    let req = client
        .build_search(&request.clone().with_api_key("request-key"))
        .unwrap();
    assert!(req.url.ends_with("key=request-key"));
}
