//! Lottery contract ABI.

use alloy::sol;

sol! {
    /// Interface of the deployed lottery contract.
    #[sol(rpc)]
    #[derive(Debug)]
    interface ILottery {
        struct Item {
            uint256 itemId;
            address[] itemTokens;
            address winner;
        }

        function getItems() external view returns (Item[] memory);
        function getOwners() external view returns (address[] memory);
        function getWinnersDeclaredStatus() external view returns (bool);

        function bid(uint256 itemId) external payable;
        function declareWinners() external;
        function withdraw() external;
        function reset() external;
        function transferOwnership(address newOwner) external;
        function selfDestruct() external;
    }
}
