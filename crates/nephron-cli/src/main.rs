use nephron::graph::ExchangeGraph;
use nephron::{ArrivalQueue, PolicyKind, Pool, PoolConfig, RoundReport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Graph(nephron::graph::Error),
    Engine(nephron::Error),
    Json(serde_json::Error),
    Parse {
        path: String,
        line: usize,
        message: String,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Graph(err) => write!(f, "{err}"),
            CliError::Engine(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Parse {
                path,
                line,
                message,
            } => write!(f, "{path}:{line}: {message}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<nephron::graph::Error> for CliError {
    fn from(value: nephron::graph::Error) -> Self {
        Self::Graph(value)
    }
}

impl From<nephron::Error> for CliError {
    fn from(value: nephron::Error) -> Self {
        Self::Engine(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Run,
    Gen,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    files: Vec<String>,
    rounds: usize,
    config: PoolConfig,
    json: bool,
    weights_in: Option<String>,
    weights_out: Option<String>,
    seed: u64,
    vertices: usize,
    arrivals: usize,
    ndds: usize,
    out: String,
}

fn usage() -> &'static str {
    "nephron-cli\n\
\n\
USAGE:\n\
  nephron-cli [run] [OPTIONS] <edges> <ndds> <arrivals>\n\
  nephron-cli gen [--seed <n>] [--vertices <n>] [--ndds <n>] [--arrivals <n>] [--out <prefix>]\n\
\n\
OPTIONS:\n\
  --rounds <n>             rounds to play (default 10)\n\
  --policy <name>          lookahead or td-learned (default lookahead)\n\
  --max-cycle <n>          largest exchange cycle, in pairs (default 3)\n\
  --max-chain <n>          longest donation chain, in pairs (default 3)\n\
  --horizon <n>            simulated future rounds per decision (default 2)\n\
  --discount <x>           reward discount per simulated round (default 0.9)\n\
  --attrition <n>          longest-waiting pairs leaving per round (default 2)\n\
  --alpha <x>              TD learning step size (default 0.2)\n\
  --edge-success-prob <x>  per-edge success probability for cycle scores (default 1)\n\
  --weights <path>         seed the TD weight vector from a JSON object\n\
  --weights-out <path>     write the weight vector as JSON after the run\n\
  --json                   print one JSON report per round instead of text\n\
\n\
NOTES:\n\
  - Input files are lines of `source target score`, whitespace-separated; blank lines are skipped.\n\
  - <edges> lists pair-to-pair edges, <ndds> donor-to-pair edges, <arrivals> the queued edges.\n\
  - Pass '-' for one input file to read it from stdin.\n\
  - gen writes <prefix>_edges.tsv, <prefix>_ndds.tsv and <prefix>_arrivals.tsv.\n\
"
}

fn parse_policy(name: &str) -> Result<PolicyKind, CliError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "lookahead" => Ok(PolicyKind::Lookahead),
        "td" | "td-learned" => Ok(PolicyKind::TdLearned),
        _ => Err(CliError::Usage(usage())),
    }
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    fn value<'a, I>(it: &mut I) -> Result<&'a str, CliError>
    where
        I: Iterator<Item = &'a String>,
    {
        it.next()
            .map(String::as_str)
            .ok_or(CliError::Usage(usage()))
    }

    fn number<T: std::str::FromStr>(raw: &str) -> Result<T, CliError> {
        raw.parse::<T>().map_err(|_| CliError::Usage(usage()))
    }

    let mut args = Args {
        rounds: 10,
        config: PoolConfig::default(),
        vertices: 20,
        arrivals: 10,
        ndds: 5,
        out: "pool".to_string(),
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "run" => args.command = Command::Run,
            "gen" => args.command = Command::Gen,
            "--rounds" => args.rounds = number(value(&mut it)?)?,
            "--policy" => args.config.policy = parse_policy(value(&mut it)?)?,
            "--max-cycle" => args.config.max_cycle = number(value(&mut it)?)?,
            "--max-chain" => args.config.max_chain = number(value(&mut it)?)?,
            "--horizon" => args.config.horizon = number(value(&mut it)?)?,
            "--discount" => {
                args.config.discount = number(value(&mut it)?)?;
                if !(args.config.discount.is_finite() && args.config.discount >= 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--attrition" => args.config.attrition = number(value(&mut it)?)?,
            "--alpha" => {
                args.config.alpha = number(value(&mut it)?)?;
                if !args.config.alpha.is_finite() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--edge-success-prob" => {
                args.config.edge_success_prob = number(value(&mut it)?)?;
                if !(0.0..=1.0).contains(&args.config.edge_success_prob) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--weights" => args.weights_in = Some(value(&mut it)?.to_string()),
            "--weights-out" => args.weights_out = Some(value(&mut it)?.to_string()),
            "--json" => args.json = true,
            "--seed" => args.seed = number(value(&mut it)?)?,
            "--vertices" => args.vertices = number(value(&mut it)?)?,
            "--arrivals" => args.arrivals = number(value(&mut it)?)?,
            "--ndds" => args.ndds = number(value(&mut it)?)?,
            "--out" => args.out = value(&mut it)?.to_string(),
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => args.files.push(path.to_string()),
        }
    }

    match args.command {
        Command::Run if args.files.len() != 3 => Err(CliError::Usage(usage())),
        Command::Gen if !args.files.is_empty() => Err(CliError::Usage(usage())),
        Command::Gen if args.vertices == 0 => Err(CliError::Usage(usage())),
        _ => Ok(args),
    }
}

fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn parse_edges(text: &str, path: &str) -> Result<Vec<(String, String, f64)>, CliError> {
    let mut edges = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(source), Some(target), Some(score), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(CliError::Parse {
                path: path.to_string(),
                line: idx + 1,
                message: "expected `source target score`".to_string(),
            });
        };
        let score = score.parse::<f64>().map_err(|err| CliError::Parse {
            path: path.to_string(),
            line: idx + 1,
            message: format!("bad score `{score}`: {err}"),
        })?;
        edges.push((source.to_string(), target.to_string(), score));
    }
    Ok(edges)
}

fn print_report(report: &RoundReport) {
    println!("round {}", report.round);
    for cycle in &report.action.cycles {
        println!("cycle:\t{}\t{}", cycle.vertices.join("\t"), cycle.score);
    }
    for chain in &report.action.chains {
        println!(
            "chain:\t{}\t{}\t{}",
            chain.ndd,
            chain.vertices.join("\t"),
            chain.score
        );
    }
    println!(
        "admitted {}\tremoved {}",
        report.admitted.len(),
        report.removed.len()
    );
}

fn run_rounds(args: &Args) -> Result<(), CliError> {
    let [edges_path, ndds_path, arrivals_path] = args.files.as_slice() else {
        return Err(CliError::Usage(usage()));
    };
    let edges = parse_edges(&read_input(edges_path)?, edges_path)?;
    let ndd_edges = parse_edges(&read_input(ndds_path)?, ndds_path)?;
    let arrivals = parse_edges(&read_input(arrivals_path)?, arrivals_path)?;

    let mut graph = ExchangeGraph::new();
    graph.add_edges(&edges)?;
    graph.add_ndd_edges(&ndd_edges)?;
    let queue: ArrivalQueue = arrivals.into_iter().collect();

    let mut pool = Pool::new(graph, queue, args.config.clone());
    if let Some(path) = args.weights_in.as_deref() {
        let weights: BTreeMap<String, f64> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        pool.set_weights(weights);
    }

    for _ in 0..args.rounds {
        let report = pool.round()?;
        if args.json {
            println!("{}", report.to_json());
        } else {
            print_report(&report);
        }
    }

    if let Some(path) = args.weights_out.as_deref() {
        std::fs::write(path, serde_json::to_string_pretty(pool.weights())?)?;
    }
    Ok(())
}

fn run_gen(args: &Args) -> Result<(), CliError> {
    // Every source gets this many draws; repeats are dropped, so out-degrees
    // land in 1..=ATTEMPTS_PER_SOURCE.
    const ATTEMPTS_PER_SOURCE: usize = 10;

    fn distinct_target(rng: &mut StdRng, bound: usize, picked: &mut Vec<usize>) -> Option<usize> {
        let target = rng.gen_range(0..bound);
        if picked.contains(&target) {
            return None;
        }
        picked.push(target);
        Some(target)
    }

    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut edges = String::new();
    for source in 0..args.vertices {
        let mut picked = Vec::new();
        for _ in 0..ATTEMPTS_PER_SOURCE {
            let Some(target) = distinct_target(&mut rng, args.vertices, &mut picked) else {
                continue;
            };
            let score: f64 = rng.gen_range(0.0..1.0);
            edges.push_str(&format!("{source}\t{target}\t{score}\n"));
        }
    }

    let mut ndds = String::new();
    for donor in 0..args.ndds {
        let mut picked = Vec::new();
        for _ in 0..ATTEMPTS_PER_SOURCE {
            let Some(target) = distinct_target(&mut rng, args.vertices, &mut picked) else {
                continue;
            };
            let score: f64 = rng.gen_range(0.0..1.0);
            ndds.push_str(&format!("n{donor}\t{target}\t{score}\n"));
        }
    }

    let mut arrivals = String::new();
    for offset in 0..args.arrivals {
        let newcomer = args.vertices + offset;
        let mut picked = Vec::new();
        for _ in 0..ATTEMPTS_PER_SOURCE {
            let Some(target) = distinct_target(&mut rng, args.vertices, &mut picked) else {
                continue;
            };
            let score: f64 = rng.gen_range(0.0..1.0);
            // Most arrival edges point from the newcomer into the pool; the
            // rest point back at the newcomer.
            if rng.gen_range(0.0..1.0) > 0.3 {
                arrivals.push_str(&format!("{newcomer}\t{target}\t{score}\n"));
            } else {
                arrivals.push_str(&format!("{target}\t{newcomer}\t{score}\n"));
            }
        }
    }

    let edges_path = format!("{}_edges.tsv", args.out);
    let ndds_path = format!("{}_ndds.tsv", args.out);
    let arrivals_path = format!("{}_arrivals.tsv", args.out);
    std::fs::write(&edges_path, edges)?;
    std::fs::write(&ndds_path, ndds)?;
    std::fs::write(&arrivals_path, arrivals)?;
    println!("{edges_path}\n{ndds_path}\n{arrivals_path}");
    Ok(())
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Command::Run => run_rounds(&args),
        Command::Gen => run_gen(&args),
    };
    match result {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
