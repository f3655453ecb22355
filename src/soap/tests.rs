use super::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct OrderStatus {
    order_ref: String,
    progress_status: String,
}

#[test]
fn test_envelope_creation() {
    let status = OrderStatus {
        order_ref: "131daac9-16c6-4618-beb0-365768f37288".to_string(),
        progress_status: "COMPLETE".to_string(),
    };

    let envelope = Envelope::new(status.clone());

    assert_eq!(envelope.body(), &status);
    assert_eq!(envelope.into_body(), status);
}

#[test]
fn test_serialize_soap() {
    let status = OrderStatus {
        order_ref: "order-1".to_string(),
        progress_status: "OUTSTANDING_TRANSACTION".to_string(),
    };
    let envelope = Envelope::new(status);

    let xml = envelope.serialize_soap(false).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<soapenv:Envelope"));
    assert!(xml.contains("xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\""));
    assert!(xml.contains("xmlns=\"http://bankid.com/RpService/v4.0.0/types/\""));
    assert!(xml.contains("<soapenv:Body>"));
    assert!(xml.contains("<orderRef>order-1</orderRef>"));
    assert!(xml.contains("<progressStatus>OUTSTANDING_TRANSACTION</progressStatus>"));
    assert!(xml.contains("</soapenv:Body>"));
    assert!(xml.contains("</soapenv:Envelope>"));
}

#[test]
fn test_serialize_wrapped_operation_element() {
    #[derive(Debug, Serialize)]
    struct CollectCall {
        #[serde(rename = "CollectRequest")]
        request: OrderStatus,
    }

    let call = CollectCall {
        request: OrderStatus {
            order_ref: "order-2".to_string(),
            progress_status: "STARTED".to_string(),
        },
    };

    let xml = Envelope::new(call).serialize_soap(false).unwrap();

    // The wrapper struct stays invisible; only the renamed operation
    // element appears inside the body.
    assert!(xml.contains("<soapenv:Body><CollectRequest>"));
    assert!(!xml.contains("CollectCall"));
}

#[test]
fn test_envelope_deserialization() {
    // Test with different prefixes
    let test_cases = [
        // soapenv prefix
        r#"<?xml version="1.0" encoding="UTF-8"?>
            <soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
                <soapenv:Body>
                    <CollectResponse>
                        <orderRef>order-3</orderRef>
                        <progressStatus>COMPLETE</progressStatus>
                    </CollectResponse>
                </soapenv:Body>
            </soapenv:Envelope>"#,
        // soap prefix
        r#"<?xml version="1.0" encoding="UTF-8"?>
            <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
                <soap:Body>
                    <CollectResponse>
                        <orderRef>order-3</orderRef>
                        <progressStatus>COMPLETE</progressStatus>
                    </CollectResponse>
                </soap:Body>
            </soap:Envelope>"#,
        // No prefix
        r#"<?xml version="1.0" encoding="UTF-8"?>
            <Envelope xmlns="http://schemas.xmlsoap.org/soap/envelope/">
                <Body>
                    <CollectResponse>
                        <orderRef>order-3</orderRef>
                        <progressStatus>COMPLETE</progressStatus>
                    </CollectResponse>
                </Body>
            </Envelope>"#,
    ];

    for (i, xml) in test_cases.iter().enumerate() {
        let result = Envelope::<OrderStatus>::parse(xml);
        assert!(
            result.is_ok(),
            "Failed to parse XML with case {i}: {:?}",
            result.unwrap_err()
        );

        let envelope = result.unwrap();
        assert_eq!(envelope.body().order_ref, "order-3");
        assert_eq!(envelope.body().progress_status, "COMPLETE");
    }
}

#[test]
fn test_header_elements_are_ignored() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
            <soapenv:Header>
                <TransactionId>ignored</TransactionId>
            </soapenv:Header>
            <soapenv:Body>
                <CollectResponse>
                    <orderRef>order-4</orderRef>
                    <progressStatus>USER_SIGN</progressStatus>
                </CollectResponse>
            </soapenv:Body>
        </soapenv:Envelope>"#;

    let envelope = Envelope::<OrderStatus>::parse(xml).unwrap();
    assert_eq!(envelope.body().order_ref, "order-4");
}

#[test]
fn test_missing_body_fails() {
    let xml_without_body = r#"<?xml version="1.0" encoding="UTF-8"?>
        <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
            <soap:Header></soap:Header>
        </soap:Envelope>"#;

    let result = Envelope::<OrderStatus>::parse(xml_without_body);
    // Should reject XML with missing body
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("missing field `Body`")
    );
}

#[test]
fn test_duplicate_body_fields_rejected() {
    let xml_with_duplicate = r#"<?xml version="1.0" encoding="UTF-8"?>
        <env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">
            <env:Body>
                <CollectResponse>
                    <orderRef>order-5</orderRef>
                    <progressStatus>COMPLETE</progressStatus>
                </CollectResponse>
            </env:Body>
            <env:Body>
                <CollectResponse>
                    <orderRef>order-5</orderRef>
                    <progressStatus>COMPLETE</progressStatus>
                </CollectResponse>
            </env:Body>
        </env:Envelope>"#;

    let result = Envelope::<OrderStatus>::parse(xml_with_duplicate);
    // Should reject XML with duplicate fields
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("duplicate field `Body`")
    );
}
