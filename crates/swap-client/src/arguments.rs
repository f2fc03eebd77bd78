use {
    crate::{sources::uniswap_v2::SUSHISWAP_INIT, web3::Spender},
    alloy::{
        primitives::{Address, B256},
        signers::local::PrivateKeySigner,
    },
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
        time::Duration,
    },
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[macro_export]
macro_rules! logging_args_with_default_filter {
    ($struct_name:ident ,$default_filter:literal) => {
        #[derive(clap::Parser)]
        pub struct $struct_name {
            #[clap(long, env, default_value = $default_filter)]
            pub log_filter: String,

            #[clap(long, env, default_value = "error")]
            pub log_stderr_threshold: LevelFilter,

            /// Output log events as JSON.
            #[clap(long, env)]
            pub use_json_logs: bool,
        }

        impl ::std::fmt::Display for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let Self {
                    log_filter,
                    log_stderr_threshold,
                    use_json_logs,
                } = self;

                writeln!(f, "log_filter: {}", log_filter)?;
                writeln!(f, "log_stderr_threshold: {}", log_stderr_threshold)?;
                writeln!(f, "use_json_logs: {}", use_json_logs)?;
                Ok(())
            }
        }
    };
}

logging_args_with_default_filter!(LoggingArguments, "warn,swap_client=debug");

#[derive(clap::Parser)]
#[clap(name = "swap-client", about = "Swaps tokens and places limit orders")]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// The node of the network the order book is deployed on. Defaults to
    /// `--node-url`.
    #[clap(long, env)]
    pub order_book_node_url: Option<Url>,

    /// Private key of the account that approves tokens and swaps.
    #[clap(long, env)]
    pub private_key: Option<PrivateKeySigner>,

    /// Private key signing limit orders and paying for their submission to
    /// the order book. Defaults to `--private-key`.
    #[clap(long, env)]
    pub order_book_private_key: Option<PrivateKeySigner>,

    /// The account whose balances and allowances are shown. Defaults to the
    /// address of `--private-key`.
    #[clap(long, env)]
    pub account: Option<Address>,

    /// Only tokens of this chain are loaded from the token list.
    #[clap(long, env, default_value = "1")]
    pub chain_id: u64,

    /// The Uniswap V2 like router. Defaults to the SushiSwap deployment of
    /// the connected chain.
    #[clap(long, env)]
    pub router: Option<Address>,

    /// Init code digest of the pairs created by the router's factory.
    #[clap(long, env, default_value_t = SUSHISWAP_INIT)]
    pub init_code_digest: B256,

    /// The settlement contract limit orders are hashed by and filled through.
    #[clap(long, env)]
    pub settlement: Option<Address>,

    /// The order book limit orders are submitted to.
    #[clap(long, env)]
    pub order_book: Option<Address>,

    /// Token list in the Uniswap token list format. Defaults to the list
    /// shipped with the binary.
    #[clap(long, env)]
    pub token_list: Option<PathBuf>,

    /// How long a swap may wait to be mined before the router rejects it.
    #[clap(
        long,
        env,
        default_value = "5m",
        value_parser = humantime::parse_duration,
    )]
    pub swap_validity: Duration,

    /// Maximum slippage of a swap in basis points. Without it a swap accepts
    /// any positive output.
    #[clap(long, env, value_parser = clap::value_parser!(u16).range(0..=10_000))]
    pub slippage_bps: Option<u16>,

    /// How long pairs without a pool are remembered before they are looked up
    /// again.
    #[clap(
        long,
        env,
        default_value = "1h",
        value_parser = humantime::parse_duration,
    )]
    pub missing_pool_cache_time: Duration,

    #[clap(subcommand)]
    pub command: Command,
}

/// Tokens are given by symbol or address.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Lists the tokens whose symbol starts with a prefix.
    Tokens {
        #[clap(default_value = "")]
        prefix: String,

        /// Leave out the native asset.
        #[clap(long)]
        without_eth: bool,
    },
    /// Shows the mid-prices of a token pair in the wrapped native token.
    Quote { one: String, two: String },
    /// Shows the account's balance of a token.
    Balance { token: String },
    /// Grants the router or the settlement contract an unlimited allowance.
    Approve {
        token: String,

        #[clap(long, default_value = "router")]
        spender: Spender,
    },
    /// Swaps one token for another through the router.
    Swap {
        one: String,
        two: String,

        #[clap(long, required_unless_present = "max")]
        amount: Option<String>,

        /// Swap the account's whole balance.
        #[clap(long, conflicts_with = "amount")]
        max: bool,

        /// Approve the router first if its allowance is missing.
        #[clap(long)]
        approve: bool,
    },
    /// Signs a limit order and submits it to the order book.
    LimitOrder {
        one: String,
        two: String,

        #[clap(long, required_unless_present = "max")]
        amount: Option<String>,

        /// Sell the account's whole balance.
        #[clap(long, conflicts_with = "amount")]
        max: bool,

        /// Minimum amount of the second token to receive.
        #[clap(long)]
        min_out: String,

        /// Approve the settlement contract first if its allowance doesn't
        /// cover the amount.
        #[clap(long)]
        approve: bool,
    },
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            node_url,
            order_book_node_url,
            private_key,
            order_book_private_key,
            account,
            chain_id,
            router,
            init_code_digest,
            settlement,
            order_book,
            token_list,
            swap_validity,
            slippage_bps,
            missing_pool_cache_time,
            command,
        } = self;

        write!(f, "{}", logging)?;
        writeln!(f, "node_url: {}", node_url)?;
        display_option(f, "order_book_node_url", order_book_node_url)?;
        display_secret_option(f, "private_key", private_key)?;
        display_secret_option(f, "order_book_private_key", order_book_private_key)?;
        display_option(f, "account", account)?;
        writeln!(f, "chain_id: {}", chain_id)?;
        display_option(f, "router", router)?;
        writeln!(f, "init_code_digest: {}", init_code_digest)?;
        display_option(f, "settlement", settlement)?;
        display_option(f, "order_book", order_book)?;
        display_option(
            f,
            "token_list",
            &token_list.as_ref().map(|path| path.display()),
        )?;
        writeln!(f, "swap_validity: {:?}", swap_validity)?;
        display_option(f, "slippage_bps", slippage_bps)?;
        writeln!(f, "missing_pool_cache_time: {:?}", missing_pool_cache_time)?;
        writeln!(f, "command: {:?}", command)?;
        Ok(())
    }
}

pub fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    match option {
        Some(display) => writeln!(f, "{}: {}", name, display),
        None => writeln!(f, "{}: None", name),
    }
}

pub fn display_secret_option<T>(f: &mut Formatter<'_>, name: &str, option: &Option<T>) -> fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}

#[cfg(test)]
mod tests {
    use {super::*, clap::Parser};

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn parses_swap_with_defaults() {
        let args = Arguments::try_parse_from([
            "swap-client",
            "--private-key",
            KEY,
            "swap",
            "ETH",
            "SUSHI",
            "--amount",
            "1.5",
        ])
        .unwrap();

        assert_eq!(args.swap_validity, Duration::from_secs(300));
        assert_eq!(args.init_code_digest, SUSHISWAP_INIT);
        assert_eq!(args.chain_id, 1);
        assert!(args.slippage_bps.is_none());
        assert!(matches!(
            args.command,
            Command::Swap { amount: Some(ref amount), max: false, .. } if amount == "1.5"
        ));
    }

    #[test]
    fn swap_needs_amount_or_max() {
        assert!(Arguments::try_parse_from(["swap-client", "swap", "DAI", "SUSHI"]).is_err());
        assert!(
            Arguments::try_parse_from([
                "swap-client",
                "swap",
                "DAI",
                "SUSHI",
                "--amount",
                "1",
                "--max"
            ])
            .is_err()
        );
        assert!(Arguments::try_parse_from(["swap-client", "swap", "DAI", "SUSHI", "--max"]).is_ok());
    }

    #[test]
    fn slippage_is_bounded() {
        assert!(
            Arguments::try_parse_from(["swap-client", "--slippage-bps", "10001", "tokens"])
                .is_err()
        );
        let args =
            Arguments::try_parse_from(["swap-client", "--slippage-bps", "50", "tokens"]).unwrap();
        assert_eq!(args.slippage_bps, Some(50));
    }

    #[test]
    fn parses_spender() {
        let args = Arguments::try_parse_from([
            "swap-client",
            "approve",
            "DAI",
            "--spender",
            "settlement",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Approve {
                spender: Spender::Settlement,
                ..
            }
        ));
    }

    #[test]
    fn display_masks_private_keys() {
        let args = Arguments::try_parse_from([
            "swap-client",
            "--private-key",
            KEY,
            "balance",
            "DAI",
        ])
        .unwrap();
        let display = args.to_string();
        assert!(display.contains("private_key: SECRET"));
        assert!(display.contains("order_book_private_key: None"));
        assert!(!display.contains(&KEY[2..]));
    }
}
