//! Definitions of Solidity functions called during deployment, administration & inspection
#![allow(missing_docs, clippy::missing_docs_in_private_items)]

use alloy_sol_types::sol;

sol! {
    /// An oracle price source, as stored by `D3Oracle`
    #[derive(Debug, PartialEq, Eq)]
    struct PriceSource {
        address oracle;
        bool isWhitelisted;
        uint256 priceTolerance;
        uint8 priceDecimal;
        uint8 tokenDecimal;
    }

    interface ID3Oracle {
        function setPriceSource(address token, PriceSource source) external;
        function getPrice(address token) external view returns (uint256);
    }

    interface ID3MMFactory {
        function addLiquidator(address account) external;
        function addRouter(address router) external;
        function setOracle(address oracle) external;
        function setD3Logic(address logic) external;
        function _D3_LOGIC_() external view returns (address);
        function _ORACLE_() external view returns (address);
        function breedDODO(
            address owner,
            address[] tokenList,
            uint256 epochStartTime,
            uint256 epochDuration,
            uint256 collateralConstant,
            uint256 liquidationDiscount
        ) external returns (address);
    }

    interface ID3MM {
        function setNextEpoch(address[] tokenList, uint256[] interestRates) external;
        function executeEpochUpdate() external;
        function setMaxDeposit(address token, uint256 maxDeposit) external;
        function ownerDeposit(address token) external;
        function lpDeposit(address lp, address token) external;
        function ownerWithdraw(address to, address token, uint256 amount) external;
        function addNewToken(address token, uint256 interestRate, uint256 maxDepositAmount) external;
        function getStatus() external view returns (uint8);
        function getCollateralRatio() external view returns (uint256);
        function getTotalAssetsValue() external view returns (uint256);
        function getTotalDebtValue() external view returns (uint256);
        function getTokenList() external view returns (address[]);
        function getTokenReserve(address token) external view returns (uint256);
        function getAssetInfo(address token) external view returns (
            address d3Token,
            uint256 reserve,
            uint256 maxDepositAmount,
            uint256 accruedInterest
        );
        function getInterestRate(address token) external view returns (uint256);
        // Only the leading fields of the pool info are decoded
        function getD3MMInfo() external view returns (address creator, address oracle);
    }

    interface IERC20Mock {
        function mint(address to, uint256 amount) external;
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }
}
