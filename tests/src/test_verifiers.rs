mod common;

use common::{dns, handshake, Pki, SAN_NAMES, WEBRTC_CN};
use peer_name_verify::{ClientNameVerification, ProtocolVersions, ServerNameVerification};

fn pki() -> Pki {
    let pki = Pki::new();
    pki.issue("server", SAN_NAMES, Some(WEBRTC_CN))
        .issue("legacy", &[], Some(WEBRTC_CN))
        .issue("ip-only", &["127.0.0.1"], Some("www.webrtc.org"))
        .issue("client", &["client.test"], Some("client.webrtc.org"))
        .issue("legacy-client", &[], Some("*.webrtc.org"));
    pki
}

async fn client_accepts(
    pki: &Pki,
    server_stem: &str,
    verification: ServerNameVerification,
    name: &'static str,
) -> bool {
    let versions = ProtocolVersions::v13_only();
    let client_config = pki.client_config(versions, verification);
    let server_config = pki.server_config(versions, server_stem, ClientNameVerification::None);

    handshake(client_config, server_config, name)
        .await
        .client
        .is_ok()
}

#[tokio::test]
async fn can_verify_server_name_in_san_extension() {
    let pki = pki();
    for name in ["foo.test", "a.bar.test", "b.bar.test", "test.webrtc.org"] {
        assert!(
            client_accepts(&pki, "server", ServerNameVerification::SanOrCommonName, name).await,
            "{name}"
        );
        assert!(
            client_accepts(&pki, "server", ServerNameVerification::SanExtOnly, name).await,
            "{name}"
        );
    }
}

#[tokio::test]
async fn common_name_is_ignored_when_san_extension_present() {
    let pki = pki();
    assert!(
        !client_accepts(
            &pki,
            "server",
            ServerNameVerification::SanOrCommonName,
            "www.webrtc.org"
        )
        .await
    );
}

#[tokio::test]
async fn wildcard_does_not_match_other_label_counts() {
    let pki = pki();
    for name in ["a.b.bar.test", "notbar.test", "bar.test"] {
        assert!(
            !client_accepts(&pki, "server", ServerNameVerification::SanOrCommonName, name).await,
            "{name}"
        );
    }
}

#[tokio::test]
async fn can_verify_server_name_in_common_name() {
    let pki = pki();
    for name in ["www.webrtc.org", "alice.webrtc.org", "bob.webrtc.org"] {
        assert!(
            client_accepts(&pki, "legacy", ServerNameVerification::SanOrCommonName, name).await,
            "{name}"
        );
    }
    for name in ["a.b.webrtc.org", "notwebrtc.org", "webrtc.org"] {
        assert!(
            !client_accepts(&pki, "legacy", ServerNameVerification::SanOrCommonName, name).await,
            "{name}"
        );
    }
}

#[tokio::test]
async fn san_without_dns_names_falls_back_to_common_name() {
    let pki = pki();
    assert!(
        client_accepts(
            &pki,
            "ip-only",
            ServerNameVerification::SanOrCommonName,
            "www.webrtc.org"
        )
        .await
    );
    assert!(
        !client_accepts(
            &pki,
            "ip-only",
            ServerNameVerification::SanOrCommonName,
            "alice.webrtc.org"
        )
        .await
    );
    assert!(
        !client_accepts(
            &pki,
            "ip-only",
            ServerNameVerification::SanExtOnly,
            "www.webrtc.org"
        )
        .await
    );
}

#[tokio::test]
async fn san_only_rejects_legacy_common_name() {
    let pki = pki();
    assert!(
        !client_accepts(
            &pki,
            "legacy",
            ServerNameVerification::SanExtOnly,
            "www.webrtc.org"
        )
        .await
    );
}

#[tokio::test]
async fn disabled_name_verification_accepts_any_name() {
    let pki = pki();
    // doesn't matter what this is b/c it won't be checked
    assert!(
        client_accepts(
            &pki,
            "server",
            ServerNameVerification::DisableNameVerification,
            "whatever"
        )
        .await
    );
}

#[tokio::test]
async fn chain_is_verified_even_if_name_matches() {
    let trusted = pki();
    let untrusted = pki();

    let versions = ProtocolVersions::v13_only();
    let client_config =
        trusted.client_config(versions, ServerNameVerification::DisableNameVerification);
    let server_config =
        untrusted.server_config(versions, "server", ClientNameVerification::None);

    let result = handshake(client_config, server_config, "foo.test").await;
    assert!(result.client.is_err());
}

#[tokio::test]
async fn name_verification_works_with_tls12() {
    let pki = pki();
    let versions = ProtocolVersions::v12_only();

    let accepted = handshake(
        pki.client_config(versions, ServerNameVerification::SanOrCommonName),
        pki.server_config(versions, "server", ClientNameVerification::None),
        "a.bar.test",
    )
    .await;
    assert!(accepted.client.is_ok());
    assert!(accepted.server.is_ok());

    let rejected = handshake(
        pki.client_config(versions, ServerNameVerification::SanOrCommonName),
        pki.server_config(versions, "server", ClientNameVerification::None),
        "www.webrtc.org",
    )
    .await;
    assert!(rejected.client.is_err());
}

async fn server_accepts(pki: &Pki, client_stem: &str, verification: ClientNameVerification) -> bool {
    let versions = ProtocolVersions::v13_only();

    let client_config = pki.client_config_as(
        versions,
        ServerNameVerification::DisableNameVerification,
        client_stem,
    );
    let server_config = pki.server_config(versions, "server", verification);

    handshake(client_config, server_config, "foo.test")
        .await
        .server
        .is_ok()
}

#[tokio::test]
async fn server_can_verify_client_name() {
    let pki = pki();

    assert!(server_accepts(&pki, "client", ClientNameVerification::None).await);
    assert!(
        server_accepts(
            &pki,
            "client",
            ClientNameVerification::SanExtOnly(dns("client.test"))
        )
        .await
    );
    assert!(
        server_accepts(
            &pki,
            "client",
            ClientNameVerification::SanOrCommonName(dns("CLIENT.test"))
        )
        .await
    );

    // SAN present, so the CN doesn't count
    assert!(
        !server_accepts(
            &pki,
            "client",
            ClientNameVerification::SanOrCommonName(dns("client.webrtc.org"))
        )
        .await
    );
}

#[tokio::test]
async fn server_can_verify_legacy_client_name() {
    let pki = pki();

    assert!(
        server_accepts(
            &pki,
            "legacy-client",
            ClientNameVerification::SanOrCommonName(dns("alice.webrtc.org"))
        )
        .await
    );
    assert!(
        !server_accepts(
            &pki,
            "legacy-client",
            ClientNameVerification::SanOrCommonName(dns("webrtc.org"))
        )
        .await
    );
    assert!(
        !server_accepts(
            &pki,
            "legacy-client",
            ClientNameVerification::SanExtOnly(dns("alice.webrtc.org"))
        )
        .await
    );
}

#[test]
fn no_protocol_version_is_an_error() {
    let pki = pki();
    let result = peer_name_verify::client::authority(
        ProtocolVersions::new(),
        ServerNameVerification::SanOrCommonName,
        &pki.path("ca.crt"),
        &pki.path("client.crt"),
        &pki.path("client.key"),
        None,
    );
    assert!(result.is_err());
}

#[test]
fn missing_files_are_reported() {
    let pki = pki();
    let result = peer_name_verify::server::authority(
        ProtocolVersions::all(),
        ClientNameVerification::None,
        &pki.path("ca.crt"),
        &pki.path("does-not-exist.crt"),
        &pki.path("server.key"),
        None,
    );
    assert!(result.unwrap_err().to_string().starts_with("I/O error"));
}
