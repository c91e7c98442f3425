use super::*;
use pretty_assertions::assert_eq;

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:ns1="urn:luxew" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:SOAP-ENC="http://schemas.xmlsoap.org/soap/encoding/">
  <SOAP-ENV:Body>{body}</SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#
    )
}

#[test]
fn request_envelope_escapes_argument_text() {
    let xml = encode_request(
        "urn:luxew",
        "authentifierUtilisateur",
        &[
            ("pseudo", "alice".to_string()),
            ("motDePasse", "a<b&c".to_string()),
        ],
    );
    assert!(xml.contains("<ns1:authentifierUtilisateur><pseudo>alice</pseudo>"));
    assert!(xml.contains("<motDePasse>a&lt;b&amp;c</motDePasse>"));
    assert!(xml.contains(r#"xmlns:ns1="urn:luxew""#));
}

#[test]
fn auth_response_decodes_to_record() {
    let xml = envelope(
        "<ns1:authentifierUtilisateurResponse>\
           <succes>true</succes><jeton>T1</jeton>\
         </ns1:authentifierUtilisateurResponse>",
    );
    assert_eq!(
        decode_response(&xml).expect("decode"),
        SoapValue::record([
            ("succes", SoapValue::text("true")),
            ("jeton", SoapValue::text("T1")),
        ])
    );
}

#[test]
fn single_return_part_is_unwrapped() {
    let xml = envelope(
        "<ns1:supprimerUtilisateurResponse><return>\
           <succes>true</succes>\
         </return></ns1:supprimerUtilisateurResponse>",
    );
    assert_eq!(
        decode_response(&xml).expect("decode"),
        SoapValue::record([("succes", SoapValue::text("true"))])
    );
}

#[test]
fn repeated_items_become_a_list_and_single_item_stays_a_record() {
    let xml = envelope(
        "<ns1:listerUtilisateursResponse><utilisateurs>\
           <item><id>1</id><pseudo>alice</pseudo></item>\
           <item><id>2</id><pseudo>bob</pseudo></item>\
         </utilisateurs></ns1:listerUtilisateursResponse>",
    );
    let value = decode_response(&xml).expect("decode");
    let items = value
        .field_any(&["utilisateurs"])
        .and_then(|users| users.field_any(&["item"]))
        .expect("items");
    assert!(matches!(items, SoapValue::List(list) if list.len() == 2));

    let xml = envelope(
        "<ns1:listerUtilisateursResponse><utilisateurs>\
           <item><id>1</id><pseudo>alice</pseudo></item>\
         </utilisateurs></ns1:listerUtilisateursResponse>",
    );
    let value = decode_response(&xml).expect("decode");
    let item = value
        .field_any(&["utilisateurs"])
        .and_then(|users| users.field_any(&["item"]))
        .expect("item");
    assert!(matches!(item, SoapValue::Record(_)));
}

#[test]
fn encoded_array_with_one_entry_is_still_a_list() {
    let xml = envelope(
        r#"<ns1:listerRolesResponse>
             <roles SOAP-ENC:arrayType="xsd:string[1]" xsi:type="SOAP-ENC:Array">
               <item xsi:type="xsd:string">admin</item>
             </roles>
           </ns1:listerRolesResponse>"#,
    );
    assert_eq!(
        decode_response(&xml).expect("decode"),
        SoapValue::record([(
            "roles",
            SoapValue::List(vec![SoapValue::text("admin")])
        )])
    );
}

#[test]
fn nil_and_empty_elements_are_absent() {
    let xml = envelope(
        r#"<ns1:authentifierUtilisateurResponse>
             <succes>false</succes><jeton xsi:nil="true"/><message></message>
           </ns1:authentifierUtilisateurResponse>"#,
    );
    assert_eq!(
        decode_response(&xml).expect("decode"),
        SoapValue::record([
            ("succes", SoapValue::text("false")),
            ("jeton", SoapValue::Absent),
            ("message", SoapValue::Absent),
        ])
    );
}

#[test]
fn apache_map_decodes_keys_as_fields() {
    let xml = envelope(
        r#"<ns1:authentifierUtilisateurResponse>
             <return xsi:type="ns2:Map">
               <item><key>succes</key><value>true</value></item>
               <item><key>jeton</key><value>T9</value></item>
             </return>
           </ns1:authentifierUtilisateurResponse>"#,
    );
    assert_eq!(
        decode_response(&xml).expect("decode"),
        SoapValue::record([
            ("succes", SoapValue::text("true")),
            ("jeton", SoapValue::text("T9")),
        ])
    );
}

#[test]
fn soap11_fault_surfaces_faultstring() {
    let xml = envelope(
        "<SOAP-ENV:Fault><faultcode>SOAP-ENV:Server</faultcode>\
         <faultstring>Jeton invalide ou expiré</faultstring></SOAP-ENV:Fault>",
    );
    let err = decode_response(&xml).expect_err("fault");
    assert!(err.to_string().contains("Jeton invalide ou expiré"));
}

#[test]
fn soap12_fault_surfaces_reason_text() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body><env:Fault>
    <env:Code><env:Value>env:Server</env:Value></env:Code>
    <env:Reason><env:Text xml:lang="fr">Fichier WSDL introuvable</env:Text></env:Reason>
  </env:Fault></env:Body>
</env:Envelope>"#;
    let err = decode_response(xml).expect_err("fault");
    assert!(err.to_string().contains("Fichier WSDL introuvable"));
}

#[test]
fn non_envelope_documents_are_rejected() {
    assert!(decode_response("<html><body>500</body></html>").is_err());
    assert!(decode_response("not xml at all <").is_err());
}

#[test]
fn empty_body_decodes_to_absent() {
    assert_eq!(
        decode_response(&envelope("")).expect("decode"),
        SoapValue::Absent
    );
}

#[test]
fn wsdl_binding_reads_address_and_namespace() {
    let wsdl = r#"<?xml version="1.0"?>
<definitions name="ServicesSoap" targetNamespace="urn:luxew"
    xmlns="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/">
  <service name="ServicesSoapService">
    <port name="ServicesSoapPort" binding="tns:ServicesSoapBinding">
      <soap:address location="http://localhost/luXew/backend/public/soap.php"/>
    </port>
  </service>
</definitions>"#;
    assert_eq!(
        parse_wsdl(wsdl).expect("wsdl"),
        WsdlBinding {
            address: Some("http://localhost/luXew/backend/public/soap.php".to_string()),
            namespace: Some("urn:luxew".to_string()),
        }
    );
}
