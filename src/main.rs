mod config;
mod handler;
mod http;
mod net;

use std::time::SystemTime;

use async_std::task;

use config::ServerConfig;
use handler::static_files::{self, HTML_UTF8};
use http::HttpMethod;
use net::server::{EngineError, Server};

fn main() -> Result<(), EngineError> {
    let config = ServerConfig::from_file("simplehttpd.toml");
    let document_root = config.document_root.clone();
    let server_name = config.server_name.clone();

    let mut server = Server::new(config);

    // Headers shared by every response, set before routing.
    server.set_init_hook(move |_req, state| {
        state.headers.insert("Server", server_name.as_str());
        state.headers.insert("Date", httpdate::fmt_http_date(SystemTime::now()));
    });

    server.register_route("/hello", |req, state| {
        let mut body = if req.method == HttpMethod::Post {
            format!(
                "Hello World. Your post is '{}'\n",
                String::from_utf8_lossy(&req.body)
            )
        } else {
            format!("Hello World at '{}'\n", req.path)
        };
        body.push_str(&format!("{:?}\n", req));
        state.set_body(body);
        state.build(200)
    });

    // longer prefix, wins over "/hello" for anything underneath it
    server.register_route("/hello/world", |_req, state| {
        state.set_body("Hello World. longest match.\n");
        state.build(200)
    });

    server.register_route("/html", |_req, state| {
        state.headers.insert("content-type", HTML_UTF8);
        state.set_body("<H1>Hello World.</H1>\n");
        state.build(200)
    });

    // custom error response message
    server.register_route("/notfound", |req, state| {
        state.set_body(format!("Not Found on this server: {}\n", req.path));
        state.build(404)
    });

    // static html contents under the document root
    server.register_route("/static/", move |req, state| {
        let is_dir = req.path.ends_with('/');
        let is_html = req.path.ends_with(".html");

        if req.method == HttpMethod::Get && (is_dir || is_html) {
            let mut filename = format!("{}{}", document_root, req.path);
            if is_dir {
                filename.push_str("index.html");
            }
            static_files::serve_file(req, state, &filename, HTML_UTF8)
        } else {
            state.set_body("Service Unavailable\n");
            state.build(503)
        }
    });

    task::block_on(server.run())
}
