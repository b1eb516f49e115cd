use clap::{Parser, ValueEnum};
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "rest-cli")]
#[command(about = "Client for a rest-dispatch server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// HTTP method to send.
    #[arg(value_enum)]
    method: Method,

    /// Resource path, e.g. `users/bob/posts`.
    path: String,

    /// Parameter as key=value. GET and DELETE send them as the query
    /// string, other methods as a JSON body.
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = format!("{}/{}", cli.url.trim_end_matches('/'), cli.path.trim_start_matches('/'));

    let request = match cli.method {
        Method::Get => client.get(&url).query(&cli.params),
        Method::Delete => client.delete(&url).query(&cli.params),
        Method::Post => client.post(&url).json(&body(&cli.params)),
        Method::Put => client.put(&url).json(&body(&cli.params)),
    };

    print_response(request.send().await?).await
}

fn body(params: &[(String, String)]) -> Value {
    let map: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
    }
    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
