pub struct Args {
    pub node_id: String,
    pub nodes: String,
    pub faults: String,
    pub base_port: String,
    pub initial: String,
    pub faulty: bool,
}

impl Args {
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();

        // Provide defaults here, but allow overrides
        Self {
            node_id: get_arg_value(&args, "--node-id").unwrap_or("0").to_string(),
            nodes: get_arg_value(&args, "--nodes").unwrap_or("3").to_string(),
            faults: get_arg_value(&args, "--faults").unwrap_or("0").to_string(),
            base_port: get_arg_value(&args, "--base-port")
                .unwrap_or("3000")
                .to_string(),
            initial: get_arg_value(&args, "--initial").unwrap_or("?").to_string(),
            faulty: args.iter().any(|arg| arg == "--faulty"),
        }
    }
}

fn get_arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == key)
        .and_then(|pos| args.get(pos + 1))
        .map(|s| s.as_str())
}
