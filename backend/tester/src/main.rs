use clap::{Parser, Subcommand};
use reqwest::{Client, Error, header::CONTENT_TYPE};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the VIP list
    List,

    /// Register a guest
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        order: String,

        /// Use the link-style GET instead of the JSON POST
        #[arg(long)]
        link: bool,
    },

    /// Clear the VIP list
    Clear,

    /// Send a browser-shaped CSP violation report
    Report {
        #[arg(long, default_value = "http://localhost:3000/")]
        document_uri: String,

        #[arg(long, default_value = "script-src-elem")]
        violated_directive: String,

        #[arg(long, default_value = "https://evil.example/x.js")]
        blocked_uri: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    let client = Client::new();
    let base = args.base_url.trim_end_matches('/');

    match args.command {
        Command::List => {
            let guests: Value = client
                .get(format!("{base}/api/orders"))
                .send()
                .await?
                .json()
                .await?;

            println!("{guests:#}");
        }
        Command::Register { name, order, link } => {
            let response = if link {
                client
                    .get(format!("{base}/api/order"))
                    .query(&[("name", &name), ("order", &order)])
                    .send()
                    .await?
            } else {
                client
                    .post(format!("{base}/api/order"))
                    .json(&json!({ "name": name, "order": order }))
                    .send()
                    .await?
            };

            println!("Status: {}", response.status());
            println!("{}", response.text().await?);
        }
        Command::Clear => {
            let response = client.get(format!("{base}/api/clear-orders")).send().await?;

            println!("{}", response.text().await?);
        }
        Command::Report {
            document_uri,
            violated_directive,
            blocked_uri,
        } => {
            let report = json!({
                "csp-report": {
                    "document-uri": document_uri,
                    "referrer": "",
                    "violated-directive": violated_directive,
                    "effective-directive": violated_directive,
                    "original-policy": "default-src 'self'",
                    "disposition": "enforce",
                    "blocked-uri": blocked_uri,
                    "status-code": 200
                }
            });

            let response = client
                .post(format!("{base}/csp-report"))
                .header(CONTENT_TYPE, "application/csp-report")
                .body(report.to_string())
                .send()
                .await?;

            println!("Status: {}", response.status());
            println!("Dashboard: {base}/csp-dashboard");
        }
    }

    Ok(())
}
