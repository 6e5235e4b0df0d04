use clap::Parser;
use jllmvm_runtime::VmConfig;
use tracing_log::log::error;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "classpath",
        visible_alias = "cp",
        visible_alias = "class-path",
        value_delimiter = ';',
        help = "Classpath entries (only dirs, no jars(todo)); use ';' as separator"
    )]
    pub class_path: Vec<String>,
    #[arg(
        long = "heap-size-mb",
        default_value_t = 256,
        help = "Heap size in megabytes"
    )]
    pub heap_size_mb: usize,
    #[arg(
        long = "tier-up-threshold",
        default_value_t = 1000,
        help = "Interpreter invocations of a method before it's queued for JIT compilation"
    )]
    pub tier_up_threshold: u32,
    #[arg(long = "print-bytecode", help = "Trace decoded bytecode as it runs")]
    pub print_bytecode: bool,
    #[arg(
        help = "Main class to run from path that matches the package structure \
        (e.g. com.example.Main or com/example/Main for com/example/Main.class)"
    )]
    pub main_class_path: String,
    #[arg(help = "Arguments passed through to the Java program's main method")]
    pub main_args: Vec<String>,
}

fn create_vm_configuration(mut args: Args, main_class: String) -> Result<VmConfig, String> {
    let java_home = std::env::var("JAVA_HOME").map_err(|_| "JAVA_HOME not set".to_string())?;
    if args.class_path.is_empty() {
        let current_dir = std::env::current_dir()
            .map(|v| v.to_string_lossy().to_string())
            .map_err(|e| format!("cannot get current dir: {e}"))?;
        args.class_path.push(current_dir);
    }

    Ok(VmConfig {
        home: std::path::PathBuf::from(java_home),
        class_path: args
            .class_path
            .into_iter()
            .map(std::path::PathBuf::from)
            .collect(),
        main_class,
        main_args: args.main_args,
        heap_size_mb: args.heap_size_mb,
        tier_up_threshold: args.tier_up_threshold,
        print_bytecode: args.print_bytecode,
    })
}

#[hotpath::main]
fn main() {
    #[cfg(feature = "log-runtime-traces")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing_log::log::debug!("Provided command line arguments: {:?}", args);

    let main_class = args.main_class_path.replace('.', "/");

    let vm_config = match create_vm_configuration(args, main_class) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error creating VM configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = jllmvm_runtime::start(vm_config) {
        error!("uncaught error: {:?}", e);
        std::process::exit(1);
    }
}
