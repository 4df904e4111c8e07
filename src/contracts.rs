//! Contract bindings and deployment addresses on Lisk mainnet.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256, address};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};

pub const WETH_ADDRESS: Address = address!("0x4200000000000000000000000000000000000006");
pub const USDT_ADDRESS: Address = address!("0x05D032ac25d322df992303dCa074EE7392C117b9");
pub const USDC_ADDRESS: Address = address!("0xF242275d3a6527d877f2c927a82D9b057609cc71");
/// Lending market that lends out USDT.
pub const USDT_MARKET_ADDRESS: Address = address!("0x0D72f18BC4b4A2F0370Af6D799045595d806636F");
/// Lending market that takes USDC deposits; also the collateral market entered.
pub const USDC_MARKET_ADDRESS: Address = address!("0x7682C12F6D1af845479649c77A9E7729F0180D78");
pub const COMPTROLLER_ADDRESS: Address = address!("0xF448A36feFb223B8E46e36FF12091baBa97bdF60");
pub const UNIVERSAL_ROUTER_ADDRESS: Address = address!("0x447B8E40B0CdA8e55F405C86bC635D02d0540aB8");

/// Allowance granted to the USDC market before supplying.
pub const USDC_SUPPLY_ALLOWANCE: u64 = 9_999_999_999_000_000;

sol! {
    #[sol(rpc)]
    interface IWETH {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
    }

    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 value) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    #[sol(rpc)]
    interface ILendingMarket {
        function mint(uint256 amount) external;
        function borrow(uint256 borrowAmount) external;
        function repayBorrow(uint256 repayAmount) external;
    }

    #[sol(rpc)]
    interface IComptroller {
        function getAccountLiquidity(address account) external view returns (uint256 err, uint256 liquidity, uint256 shortfall);
        function enterMarkets(address[] cTokens) external returns (uint256[]);
    }

    #[sol(rpc)]
    interface IUniversalRouter {
        function execute(bytes commands, bytes[] inputs, uint256 deadline) external payable;
    }
}

/// Unsigned request invoking `call` on the contract at `to`.
pub fn call_request<C: SolCall>(to: Address, call: C) -> TransactionRequest {
    TransactionRequest::default().with_to(to).with_input(call.abi_encode())
}

/// Universal router command byte for a V3 exact-input swap.
pub const V3_SWAP_EXACT_IN: u8 = 0x00;

/// Pool fee tier of the USDT/USDC pool, in hundredths of a bip.
pub const USDT_USDC_FEE: u32 = 100;

/// Fixed swap sizes in USDT/USDC base units.
pub const SWAP_AMOUNT_IN: u64 = 123;
pub const SWAP_AMOUNT_OUT_MIN: u64 = 119;

/// Packed V3 path: `token_in ‖ fee (uint24) ‖ token_out`.
pub fn v3_path(token_in: Address, fee: u32, token_out: Address) -> Bytes {
    let mut path = Vec::with_capacity(20 + 3 + 20);
    path.extend_from_slice(token_in.as_slice());
    path.extend_from_slice(&fee.to_be_bytes()[1..]);
    path.extend_from_slice(token_out.as_slice());
    path.into()
}

/// Input blob for `V3_SWAP_EXACT_IN`:
/// `(recipient, amountIn, amountOutMin, path, payerIsUser)` encoded as params.
pub fn usdt_to_usdc_swap_input(recipient: Address) -> Bytes {
    (
        recipient,
        U256::from(SWAP_AMOUNT_IN),
        U256::from(SWAP_AMOUNT_OUT_MIN),
        v3_path(USDT_ADDRESS, USDT_USDC_FEE, USDC_ADDRESS),
        true,
    )
        .abi_encode_params()
        .into()
}
