use solana_pubkey::Pubkey;
use solana_pubkey::pubkey;

/// ======================= Native tokens =======================
/// Mint sentinel used for native lamport transfers.
pub const SOL_MINT_KEY: Pubkey = pubkey!("So11111111111111111111111111111111111111111");

pub const WSOL_MINT_KEY: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

pub const USDC_MINT_KEY: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

pub const USDT_MINT_KEY: Pubkey = pubkey!("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB");

/// ======================= Program IDs =======================
pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Raydium constant-product AMM (v4)
pub const RAYDIUM_AMM_V4_PROGRAM_ID: Pubkey = pubkey!("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");

/// Orca concentrated liquidity pools
pub const ORCA_WHIRLPOOL_PROGRAM_ID: Pubkey = pubkey!("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc");

/// ======================= Mixers =======================
pub const TORNADO_ROUTER: Pubkey = pubkey!("tor1xzb2Zyy1cUxXmyJfR8aNXuWnwHG8AwgaG7UGD4K");
pub const SOLANA_MIXER: Pubkey = pubkey!("2cTfkPdJEKoZ4252vyscpuLMXxYNABSQMGyLQYvyKCNh");
pub const CYCLOS_MIXER: Pubkey = pubkey!("CJsLwbP1iu5DuUikHEJnLfANgKy6stB2uFgvBBHoyxwz");

pub const KNOWN_MIXERS: &[(Pubkey, &str)] = &[
    (TORNADO_ROUTER, "Tornado Cash Router (Wormhole)"),
    (SOLANA_MIXER, "Solana Mixer"),
    (CYCLOS_MIXER, "Cyclos Mixer"),
];

/// ======================= Bridges =======================
pub const WORMHOLE_CORE: Pubkey = pubkey!("worm2ZoG2kUd4vFXhvjh93UUH596ayRfgQ2MgjNMTth");
pub const WORMHOLE_TOKEN_BRIDGE: Pubkey = pubkey!("wormDTUJ6AWPNvk59vGQbDvGJmqbDTdgWgAqcLBCgUb");
pub const ALLBRIDGE: Pubkey = pubkey!("ALLBridnP1jw8WpG6SbRGZDhGQr8AQqXT4s1yjCHkwW");
pub const PORTAL_BRIDGE: Pubkey = pubkey!("Port7uDYB3wk6GJAw4KT1WpTeMtSu9bTcChBHkX2LfR");
pub const SOLLET_BRIDGE: Pubkey = pubkey!("SLTyZpBEN9GNyGECiTLZXgsHRfbcey8bSoyX4NKtXeA");

pub const KNOWN_BRIDGES: &[(Pubkey, &str)] = &[
    (WORMHOLE_CORE, "Wormhole Bridge"),
    (WORMHOLE_TOKEN_BRIDGE, "Wormhole Token Bridge"),
    (ALLBRIDGE, "Allbridge"),
    (PORTAL_BRIDGE, "Portal (Wormhole)"),
    (SOLLET_BRIDGE, "Sollet Bridge"),
];

/// ======================= CEX wallet =======================
pub const COINBASE_HW_1: Pubkey = pubkey!("FpwQQhQQoEaVu3WU2qZMfF1hx48YyfwsLoRgXG83E99Q");
pub const COINBASE_HW_2: Pubkey = pubkey!("GJRs4FwHtemZ5ZE9x3FNvJ8TMwitKTh21yxdRPqn7npE");
pub const COINBASE_HW_3: Pubkey = pubkey!("D89hHJT5Aqyx1trP6EnGY9jJUB3whgnq3aUvvCqedvzf");
pub const COINBASE_HW_4: Pubkey = pubkey!("DPqsobysNf5iA9w7zrQM8HLzCKZEDMkZsWbiidsAt1xo");
pub const OKX_HW_1: Pubkey = pubkey!("is6MTRHEgyFLNTfYcuV4QBWLjrZBfmhVNYR6ccgr8KV");
pub const OKX_HW_2: Pubkey = pubkey!("C68a6RCGLiPskbPYtAcsCjhG8tfTWYcoB4JjCrXFdqyo");
pub const MEXC_1: Pubkey = pubkey!("ASTyfSima4LLAdDgoFGkgqoKowG1LZFDr9fAQrg7iaJZ");
pub const MEXC_2: Pubkey = pubkey!("5PAhQiYdLBd6SVdjzBQDxUAEFyDdF5ExNPQfcscnPRj5");
pub const KRAKEN: Pubkey = pubkey!("FWznbcNXWQuHTawe9RxvQ2LdCENssh12dsznf4RiouN5");
pub const BINANCE_1: Pubkey = pubkey!("2ojv9BAiHUrvsm9gxDe7fJSzbNZSJcxZvf8dqmWGHG8S");
pub const BINANCE_2: Pubkey = pubkey!("5tzFkiKscXHK5ZXCGbXZxdw7gTjjD1mBwuoFbhUvuAi9");
pub const BINANCE_3: Pubkey = pubkey!("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
pub const BINANCE_US_HW: Pubkey = pubkey!("53unSgGWqEWANcPYRF35B2Bgf8BkszUtcccKiXwGGLyr");
pub const BITGET_EXCHANGE: Pubkey = pubkey!("A77HErqtfN1hLLpvZ9pCtu66FEtM8BveoaKbbMoZ4RiR");
pub const GATE_IO_1: Pubkey = pubkey!("u6PJ8DtQuPFnfmwHbGFULQ4u4EgjDiyYKjVEsynXq2w");
pub const BYBIT_HW: Pubkey = pubkey!("AC5RDfQFmDS1deWZos921JfqscXdByf8BKHs5ACWjtW2");
pub const BITFINEX_HW: Pubkey = pubkey!("FxteHmLwG9nk1eL4pjNve3Eub2goGkkz6g6TbvdmW46a");
pub const KUCOIN_1: Pubkey = pubkey!("57vSaRTqN9iXaemgh4AoDsZ63mcaoshfMK8NP3Z5QNbs");
pub const POLONIEX_HW: Pubkey = pubkey!("7Ci23i82UMa8RpfVbdMjTytiDi2VoZS8uLyHhZBV2Qy7");
pub const LBANK: Pubkey = pubkey!("8s9j5qUtuE9PGA5s7QeAXEh5oc2UGr71pmJXgyiZMHkt");

/// Exchange hot wallets. Labels only; exchange routes stay heuristic.
pub const KNOWN_EXCHANGES: &[(Pubkey, &str)] = &[
    (COINBASE_HW_1, "Coinbase Hot Wallet 1"),
    (COINBASE_HW_2, "Coinbase Hot Wallet 2"),
    (COINBASE_HW_3, "Coinbase Hot Wallet 3"),
    (COINBASE_HW_4, "Coinbase Hot Wallet 4"),
    (OKX_HW_1, "OKX Hot Wallet 1"),
    (OKX_HW_2, "OKX Hot Wallet 2"),
    (MEXC_1, "MEXC 1"),
    (MEXC_2, "MEXC 2"),
    (KRAKEN, "Kraken"),
    (BINANCE_1, "Binance 1"),
    (BINANCE_2, "Binance 2"),
    (BINANCE_3, "Binance 3"),
    (BINANCE_US_HW, "Binance.US Hot Wallet"),
    (BITGET_EXCHANGE, "Bitget Exchange"),
    (GATE_IO_1, "Gate.io 1"),
    (BYBIT_HW, "Bybit Hot Wallet"),
    (BITFINEX_HW, "Bitfinex Hot Wallet"),
    (KUCOIN_1, "KuCoin 1"),
    (POLONIEX_HW, "Poloniex Hot Wallet"),
    (LBANK, "LBank"),
];

/// ======================= Instruction layouts =======================
pub const SYSTEM_TRANSFER_TAG: u32 = 2;
pub const SYSTEM_TRANSFER_WITH_SEED_TAG: u32 = 11;

pub const RAYDIUM_SWAP_BASE_IN_TAG: u8 = 9;
pub const RAYDIUM_SWAP_BASE_OUT_TAG: u8 = 11;

/// sha256("global:swap")[..8]
pub const WHIRLPOOL_SWAP_DISCRIMINATOR: [u8; 8] = [248, 198, 158, 145, 225, 117, 135, 200];

/// ======================= Detector constants =======================
pub const MIXER_DEPOSIT_RISK: u8 = 80;
pub const MIXER_WITHDRAWAL_RISK: u8 = 70;
pub const BRIDGE_OUTBOUND_RISK: u8 = 60;
pub const BRIDGE_INBOUND_RISK: u8 = 50;
pub const EXCHANGE_RISK: u8 = 40;

pub const LAYERING_CONFIDENCE: f64 = 0.6;
/// Split/aggregation events need strictly more than this many distinct counterparties.
pub const LAYERING_MIN_COUNTERPARTIES: usize = 2;

pub const SANDWICH_CONFIDENCE: f64 = 0.75;

pub const ILLICIT_ENTITY_LABELS: &[&str] = &["sanctioned", "darknet_service", "scam", "phishing"];
