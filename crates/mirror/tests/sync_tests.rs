//! Synchronizer integration tests against mock upstreams.
//!
//! One mock server plays all three roles: the destination's public domain
//! (HEAD probes), the source CDN (GET), and the upload endpoint (PUT) —
//! method and path keep the routes apart.

use httpmock::Method::{GET, HEAD, PUT};
use httpmock::MockServer;
use kagami_core::{AppConfig, AssetCoordinate};
use kagami_mirror::{MirrorError, SyncOutcome, Synchronizer};
use std::net::TcpListener;

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn synchronizer_for(server: &MockServer) -> Synchronizer {
    let mut config = AppConfig::for_testing();
    config.cdn.base_url = server.base_url();
    config.storage.endpoint = Some(server.base_url());
    config.storage.public_base_url = server.base_url();
    Synchronizer::new(reqwest::Client::new(), config.cdn, config.storage).unwrap()
}

fn coordinate() -> AssetCoordinate {
    AssetCoordinate::new("jquery", "3.6.0", "jquery.min.js").unwrap()
}

#[tokio::test]
async fn sync_uploads_when_not_mirrored() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    let probe = server.mock(|when, then| {
        when.method(HEAD).path("/jquery/3.6.0/jquery.min.js");
        then.status(404);
    });
    let fetch = server.mock(|when, then| {
        when.method(GET).path("/ajax/libs/jquery/3.6.0/jquery.min.js");
        // No content-type header: the uploader must infer it from the key.
        then.status(200).body("console.log(1);");
    });
    let upload = server.mock(|when, then| {
        when.method(PUT)
            .path("/jquery/3.6.0/jquery.min.js")
            .header("content-type", "application/javascript; charset=utf-8")
            .header("content-disposition", "inline")
            .header_exists("authorization")
            .body("console.log(1);");
        then.status(200);
    });

    let outcome = synchronizer_for(&server).sync(&coordinate()).await.unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::Uploaded {
            key: "jquery/3.6.0/jquery.min.js".to_string()
        }
    );
    probe.assert();
    fetch.assert();
    upload.assert();
}

#[tokio::test]
async fn sync_short_circuits_when_already_mirrored() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    let probe = server.mock(|when, then| {
        when.method(HEAD).path("/jquery/3.6.0/jquery.min.js");
        then.status(200).header("etag", "\"abc123def.45678\"");
    });
    let fetch = server.mock(|when, then| {
        when.method(GET).path("/ajax/libs/jquery/3.6.0/jquery.min.js");
        then.status(200).body("console.log(1);");
    });

    let outcome = synchronizer_for(&server).sync(&coordinate()).await.unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::AlreadyMirrored {
            content_hash: "abc123def".to_string()
        }
    );
    probe.assert();
    // No fetch (and therefore no upload) happened.
    assert_eq!(fetch.hits(), 0);
}

#[tokio::test]
async fn sync_probe_success_without_etag_is_still_terminal() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    let probe = server.mock(|when, then| {
        when.method(HEAD).path("/jquery/3.6.0/jquery.min.js");
        then.status(200);
    });
    let fetch = server.mock(|when, then| {
        when.method(GET).path("/ajax/libs/jquery/3.6.0/jquery.min.js");
        then.status(200).body("console.log(1);");
    });

    let outcome = synchronizer_for(&server).sync(&coordinate()).await.unwrap();

    // A success probe settles the outcome even with no validator header.
    assert_eq!(
        outcome,
        SyncOutcome::AlreadyMirrored {
            content_hash: String::new()
        }
    );
    probe.assert();
    assert_eq!(fetch.hits(), 0);
}

#[tokio::test]
async fn sync_is_idempotent_across_calls() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    let mut probe = server.mock(|when, then| {
        when.method(HEAD).path("/jquery/3.6.0/jquery.min.js");
        then.status(404);
    });
    let fetch = server.mock(|when, then| {
        when.method(GET).path("/ajax/libs/jquery/3.6.0/jquery.min.js");
        then.status(200).body("console.log(1);");
    });
    server.mock(|when, then| {
        when.method(PUT).path("/jquery/3.6.0/jquery.min.js");
        then.status(200);
    });

    let synchronizer = synchronizer_for(&server);
    let first = synchronizer.sync(&coordinate()).await.unwrap();
    assert!(matches!(first, SyncOutcome::Uploaded { .. }));

    // The store is now populated: swap the probe to report presence.
    probe.delete();
    server.mock(|when, then| {
        when.method(HEAD).path("/jquery/3.6.0/jquery.min.js");
        then.status(200).header("etag", "\"abc123.1\"");
    });

    let second = synchronizer.sync(&coordinate()).await.unwrap();
    assert_eq!(
        second,
        SyncOutcome::AlreadyMirrored {
            content_hash: "abc123".to_string()
        }
    );
    // The second call performed no additional fetch.
    assert_eq!(fetch.hits(), 1);
}

#[tokio::test]
async fn sync_fails_at_fetch_stage_for_missing_asset() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(HEAD).path("/jquery/3.6.0/jquery.min.js");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/ajax/libs/jquery/3.6.0/jquery.min.js");
        then.status(404);
    });
    let upload = server.mock(|when, then| {
        when.method(PUT).path("/jquery/3.6.0/jquery.min.js");
        then.status(200);
    });

    let error = synchronizer_for(&server)
        .sync(&coordinate())
        .await
        .unwrap_err();

    assert!(matches!(error, MirrorError::FetchStatus { status: 404 }));
    assert_eq!(error.stage(), "fetch");
    assert_eq!(upload.hits(), 0);
}

#[tokio::test]
async fn sync_fails_at_upload_stage_when_store_rejects() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(HEAD).path("/jquery/3.6.0/jquery.min.js");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/ajax/libs/jquery/3.6.0/jquery.min.js");
        then.status(200).body("console.log(1);");
    });
    server.mock(|when, then| {
        when.method(PUT).path("/jquery/3.6.0/jquery.min.js");
        then.status(403).body("AccessDenied");
    });

    let error = synchronizer_for(&server)
        .sync(&coordinate())
        .await
        .unwrap_err();

    match error {
        MirrorError::UploadStatus { status, ref detail } => {
            assert_eq!(status, 403);
            assert_eq!(detail, "AccessDenied");
        }
        other => panic!("expected upload failure, got {other:?}"),
    }
    assert_eq!(error.stage(), "upload");
}

#[tokio::test]
async fn sync_prefers_declared_content_type() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(HEAD).path("/marked/4.0.0/LICENSE");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/ajax/libs/marked/4.0.0/LICENSE");
        then.status(200)
            .header("content-type", "text/plain; charset=utf-8")
            .body("MIT");
    });
    let upload = server.mock(|when, then| {
        when.method(PUT)
            .path("/marked/4.0.0/LICENSE")
            .header("content-type", "text/plain; charset=utf-8");
        then.status(200);
    });

    let coordinate = AssetCoordinate::new("marked", "4.0.0", "LICENSE").unwrap();
    let outcome = synchronizer_for(&server).sync(&coordinate).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Uploaded { .. }));
    upload.assert();
}
