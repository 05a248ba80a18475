use protoc_gen_jsonschema::cli;

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("protoc-gen-jsonschema: {error:#}");
        std::process::exit(1);
    }
}
