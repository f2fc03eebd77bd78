use {
    crate::{
        arguments::{Arguments, Command},
        controllers::{
            OrderForm,
            Services,
            limit_order::{LimitOrderController, OrderBookNetwork},
            market_order::MarketOrderController,
        },
        notification::LogNotifier,
        onchain::{OnchainReader, SettlementHasher, WalletSender},
        pricing::PriceCalculator,
        sources::uniswap_v2::UniV2Source,
        token_list::{TokenFilter, TokenList},
        traits::TransactionSending,
        web3::{Spender, Web3Service},
    },
    alloy::{
        primitives::Address,
        signers::{Signer, local::PrivateKeySigner},
    },
    anyhow::{Context, Result, bail},
    clap::Parser,
    contracts::alloy::Settlement,
    ethrpc::Web3,
    model::token::Token,
    number::units::format_units,
    std::{process::ExitCode, sync::Arc},
};

pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = Arguments::parse_from(args);
    let obs_config = observe::Config::new(
        args.logging.log_filter.as_str(),
        args.logging.log_stderr_threshold.into_level(),
        args.logging.use_json_logs,
    );
    observe::tracing::initialize(&obs_config);
    tracing::info!("running swap client with validated arguments:\n{}", args);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(?err, "swap client failed");
            ExitCode::FAILURE
        }
    }
}

pub async fn run(args: Arguments) -> Result<()> {
    let tokens = match &args.token_list {
        Some(path) => TokenList::from_path(path, args.chain_id)?,
        None => TokenList::embedded(args.chain_id)?,
    };

    let find = |value: &str| find_token(&tokens, value);

    match &args.command {
        Command::Tokens {
            prefix,
            without_eth,
        } => {
            for token in TokenFilter::new(&tokens, *without_eth).filter(prefix) {
                println!("{}\t{}\t{}", token.symbol, token.address, token.name);
            }
        }
        Command::Quote { one, two } => {
            let Node { pricing, .. } = connect(&args, &tokens).await?;
            let quote = pricing.calculate_trade(&find(one)?, &find(two)?).await?;
            for (symbol, price) in &quote.tokens {
                println!("{symbol}\t{price}");
            }
        }
        Command::Balance { token } => {
            let token = find(token)?;
            let Node { web3_service, .. } = connect(&args, &tokens).await?;
            let balance = web3_service.balance(&token).await?;
            println!("{}\t{}", token.symbol, format_units(balance, token.decimals));
        }
        Command::Approve { token, spender } => {
            ensure_settlement(&args, *spender)?;
            let Node { web3_service, .. } = connect(&args, &tokens).await?;
            let sender = wallet_sender(&args.node_url, args.private_key.clone())?;
            let approval = web3_service.approve(&find(token)?, *spender);
            let hashes = sender.send(vec![approval]).await?;
            println!("{hashes:?}");
        }
        Command::Swap {
            one,
            two,
            amount,
            max,
            approve,
        } => {
            let Node {
                web3_service,
                pricing,
            } = connect(&args, &tokens).await?;
            let services = Services {
                web3: web3_service,
                pricing,
                sender: wallet_sender(&args.node_url, args.private_key.clone())?,
                notifier: Arc::new(LogNotifier),
            };
            let mut controller =
                MarketOrderController::new(services, args.swap_validity, args.slippage_bps)?;
            let form = OrderForm {
                token_one: Some(find(one)?),
                token_one_amount: amount.clone(),
                token_two: Some(find(two)?),
                min_out: None,
            };
            controller.on_change(form).await;
            if *max {
                controller.set_max_balance().await;
            }
            log_quote(&controller);
            if controller.need_approve_token() {
                ensure_approval(*approve, Spender::Router)?;
                controller.approve_token().await.context("approval failed")?;
            }
            let hash = controller.swap().await.context("swap failed")?;
            println!("{hash}");
        }
        Command::LimitOrder {
            one,
            two,
            amount,
            max,
            min_out,
            approve,
        } => {
            ensure_settlement(&args, Spender::Settlement)?;
            let Node {
                web3_service,
                pricing,
            } = connect(&args, &tokens).await?;
            let order_book = args
                .order_book
                .context("--order-book is required for limit orders")?;
            let order_book_key = args
                .order_book_private_key
                .clone()
                .or_else(|| args.private_key.clone())
                .context("a private key is required to sign limit orders")?;
            let order_book_url = args.order_book_node_url.as_ref().unwrap_or(&args.node_url);
            let order_book_web3 = Web3::from_url(order_book_url);
            let network = OrderBookNetwork {
                maker: Arc::new(order_book_key.clone()),
                hasher: Arc::new(SettlementHasher::new(Settlement::Instance::new(
                    web3_service.spender(Spender::Settlement),
                    order_book_web3.provider,
                ))),
                order_book,
                sender: wallet_sender(order_book_url, Some(order_book_key))?,
            };
            let services = Services {
                web3: web3_service,
                pricing,
                sender: wallet_sender(&args.node_url, args.private_key.clone())?,
                notifier: Arc::new(LogNotifier),
            };
            let mut controller = LimitOrderController::new(services, network);
            let form = OrderForm {
                token_one: Some(find(one)?),
                token_one_amount: amount.clone(),
                token_two: Some(find(two)?),
                min_out: Some(min_out.clone()),
            };
            controller.on_change(form).await;
            if *max {
                controller.set_max_balance().await;
            }
            log_quote(&controller);
            if controller.need_approve_token() {
                ensure_approval(*approve, Spender::Settlement)?;
                controller.approve_token().await.context("approval failed")?;
            }
            let hash = controller
                .create_order()
                .await
                .context("limit order was not created")?;
            println!("{hash}");
        }
    }
    Ok(())
}

/// What the commands talking to a node share.
struct Node {
    web3_service: Arc<Web3Service>,
    pricing: Arc<PriceCalculator>,
}

/// Connects to the router on the node and reads the wrapped native token from
/// it.
async fn connect(args: &Arguments, tokens: &TokenList) -> Result<Node> {
    let web3 = Web3::from_url(&args.node_url);
    let source = UniV2Source::new(
        &web3,
        args.router,
        args.init_code_digest,
        args.missing_pool_cache_time,
    )
    .await?;
    let wrapped_native = tokens
        .get(&source.wrapped_native)
        .cloned()
        .unwrap_or_else(|| wrapped_native_token(source.wrapped_native));

    let account = args
        .account
        .or_else(|| args.private_key.as_ref().map(Signer::address))
        .context("either --account or --private-key is required")?;
    let web3_service = Arc::new(Web3Service::new(
        Arc::new(OnchainReader::new(web3.clone())),
        account,
        *source.router.address(),
        args.settlement.unwrap_or_default(),
        wrapped_native.address,
    ));
    let pricing = Arc::new(PriceCalculator::new(source.pool_fetching, wrapped_native));
    Ok(Node {
        web3_service,
        pricing,
    })
}

/// Tokens can be given by symbol or, for tokens on the list, by address.
fn find_token(tokens: &TokenList, value: &str) -> Result<Token> {
    let token = match value.parse::<Address>() {
        Ok(address) => tokens.get(&address),
        Err(_) => tokens.find(value),
    };
    token
        .cloned()
        .with_context(|| format!("unknown token {value:?}"))
}

fn wrapped_native_token(address: Address) -> Token {
    Token {
        address,
        symbol: "WETH".to_string(),
        name: "Wrapped Ether".to_string(),
        decimals: 18,
        logo_uri: None,
    }
}

fn wallet_sender(
    url: &url::Url,
    key: Option<PrivateKeySigner>,
) -> Result<Arc<dyn TransactionSending>> {
    let key = key.context("--private-key is required to send transactions")?;
    let sender = Signer::address(&key);
    let provider = ethrpc::alloy::provider_with_signer(url, key);
    Ok(Arc::new(WalletSender::new(provider, sender)))
}

fn ensure_settlement(args: &Arguments, spender: Spender) -> Result<()> {
    if spender == Spender::Settlement && args.settlement.is_none() {
        bail!("--settlement is required");
    }
    Ok(())
}

fn ensure_approval(approve: bool, spender: Spender) -> Result<()> {
    if !approve {
        bail!("the {spender} needs an allowance first, rerun with --approve");
    }
    Ok(())
}

fn log_quote(controller: &crate::controllers::FormCore) {
    if controller.cannot_find_pool() {
        tracing::warn!("could not find a pool to price the pair");
    }
    if let Some(quote) = controller.quote() {
        tracing::info!(prices = ?quote.tokens, "prices in wrapped native token");
    }
}

#[cfg(test)]
mod tests {
    use {super::*, testlib::tokens::DAI};

    #[test]
    fn finds_tokens_by_symbol_or_address() {
        let tokens = TokenList::embedded(1).unwrap();
        assert_eq!(find_token(&tokens, "dai").unwrap().address, DAI);
        assert_eq!(
            find_token(&tokens, "0x6B175474E89094C44Da98b954EedeAC495271d0F")
                .unwrap()
                .symbol,
            "DAI"
        );
        assert!(find_token(&tokens, "NOPE").is_err());
        assert!(find_token(&tokens, "0x0000000000000000000000000000000000000001").is_err());
    }
}
