//! Anonymous reads as the public website performs them.

#![allow(clippy::unwrap_used)]

use village_portal_client::{ClientError, PortalClient, Session, or_empty};
use village_portal_core::{ActivityDraft, ActivityStatus, RosterDraft};
use village_portal_integration_tests::TestServer;

fn activity(title: &str, date: &str, status: &str) -> ActivityDraft {
    ActivityDraft {
        title: Some(title.to_owned()),
        date: Some(date.to_owned()),
        status: Some(status.to_owned()),
        description: Some(format!("{title} bersama warga RT 05.")),
        ..ActivityDraft::default()
    }
}

#[tokio::test]
async fn test_home_page_sections() {
    let server = TestServer::start().await;
    let admin = server.admin_client().await;

    admin
        .create_activity(&activity("Posyandu", "2026-11-02", "direncanakan"))
        .await
        .unwrap();
    admin
        .create_activity(&activity("Lomba 17an", "2026-08-17", "selesai"))
        .await
        .unwrap();
    admin
        .create_roster_member(&RosterDraft {
            full_name: Some("Budi Santoso".to_owned()),
            role: Some("Ketua RT".to_owned()),
            display_order: Some(1),
            ..RosterDraft::default()
        })
        .await
        .unwrap();

    let public = server.anonymous_client();

    let agenda = public.agenda().await.unwrap();
    assert_eq!(agenda.len(), 1);
    assert_eq!(agenda[0].title, "Posyandu");
    assert_eq!(agenda[0].status, ActivityStatus::Planned);

    let posts = public.posts().await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "Posyandu");
    assert!(posts[1].excerpt.starts_with("Lomba 17an"));

    let preview = public.activities_preview().await.unwrap();
    assert_eq!(preview.len(), 2);

    let roster = public.roster_preview().await.unwrap();
    assert_eq!(roster[0].full_name, "Budi Santoso");

    let hero = public.home_hero().await.unwrap();
    assert_eq!(hero.image_path, None);
}

#[tokio::test]
async fn test_writes_require_login() {
    let server = TestServer::start().await;
    let public = server.anonymous_client();

    let err = public
        .create_activity(&activity("Rapat", "2026-11-10", "planned"))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized(), "{err}");

    let err = public.residents().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    assert!(public.activities().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_message_reaches_client() {
    let server = TestServer::start().await;
    let admin = server.admin_client().await;

    let err = admin
        .create_activity(&ActivityDraft {
            title: Some("Tanpa tanggal".to_owned()),
            ..ActivityDraft::default()
        })
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Api { status: 400, ref message } if message == "date is required"),
        "{err}"
    );
}

#[tokio::test]
async fn test_unreachable_server_renders_empty_sections() {
    // Bind and release a port so nothing is listening on it
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let client = PortalClient::new(&format!("http://{addr}"), Session::Anonymous).unwrap();
    let result = client.agenda().await;
    assert!(matches!(result, Err(ClientError::Http(_))));
    assert!(or_empty(result, "agenda").is_empty());
}
