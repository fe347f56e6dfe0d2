use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use std::time::Duration;

fn base_url(req: &HttpRequest) -> String {
    format!("http://{}", req.connection_info().host())
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Well-formed page: self-reference, x-default, matching canonical and og:url
async fn en_page(req: HttpRequest) -> HttpResponse {
    let base = base_url(&req);
    html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>English</title>
  <link rel="canonical" href="/en">
  <meta property="og:url" content="{base}/en">
  <link rel="alternate" hreflang="en" href="{base}/en">
  <link rel="alternate" hreflang="en-GB" href="{base}/en">
  <link rel="alternate" hreflang="x-default" href="{base}/">
  <link rel="alternate" type="application/rss+xml" href="/feed.xml">
</head>
<body><h1>Hello</h1></body>
</html>"#
    ))
}

/// Broken page: relative href, tag in body, bad language code, no x-default
async fn broken_page(req: HttpRequest) -> HttpResponse {
    let base = base_url(&req);
    html(format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <title>Broken</title>
  <link rel="canonical" href="{base}/somewhere-else">
  <link rel="alternate" hreflang="en_US" href="/fr">
</head>
<body>
  <link rel="alternate" hreflang="fr" href="{base}/broken">
  <p>Content</p>
</body>
</html>"#
    ))
}

async fn no_tags_page() -> HttpResponse {
    html(
        r#"<!DOCTYPE html>
<html lang="de">
<head><title>Keine</title></head>
<body><p>Nothing here</p></body>
</html>"#
            .to_string(),
    )
}

/// Answers only after the short client timeouts used in tests have expired
async fn slow_page() -> HttpResponse {
    actix_web::rt::time::sleep(Duration::from_secs(3)).await;
    html("<html><head><title>Slow</title></head></html>".to_string())
}

async fn redirect() -> HttpResponse {
    HttpResponse::MovedPermanently()
        .append_header(("Location", "/en"))
        .finish()
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().body("Not Found")
}

pub async fn get_test_server_url() -> String {
    let http_server = HttpServer::new(|| {
        App::new()
            .route("/en", web::get().to(en_page))
            .route("/broken", web::get().to(broken_page))
            .route("/no-tags", web::get().to(no_tags_page))
            .route("/slow", web::get().to(slow_page))
            .route("/redirect", web::get().to(redirect))
            .route("/not-found", web::get().to(not_found))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    url
}
