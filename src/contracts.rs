//! ABI surface of the on-chain side: the election manager contract, the
//! smart-contract-wallet execute envelope, and the EntryPoint (v0.6
//! UserOperation convention).

use alloy_sol_types::sol;

sol! {
    // Election manager calls. Selector names are fixed by the deployed
    // contracts and must not be translated.
    function taoPhienBauCu(uint256 electionId, uint256 durationSeconds, uint256 maxVoters);
    function themCuTri(uint256 electionId, uint256 sessionId, address voter);
    function themUngVien(uint256 electionId, uint256 sessionId, address candidate);
    function batDauPhienBauCu(uint256 electionId, uint256 sessionId, uint256 durationSeconds);

    // Smart-contract-wallet envelope, callable by the owner or an unexpired
    // session key.
    function execute(address target, uint256 value, bytes data) returns (bytes);

    // ERC-20 read used for the HLU token balance display.
    function balanceOf(address owner) returns (uint256);

    /// UserOperation tuple as the EntryPoint ABI sees it (v0.6 layout).
    #[derive(Debug)]
    struct UserOperationStruct {
        address sender;
        uint256 nonce;
        bytes initCode;
        bytes callData;
        uint256 callGasLimit;
        uint256 verificationGasLimit;
        uint256 preVerificationGas;
        uint256 maxFeePerGas;
        uint256 maxPriorityFeePerGas;
        bytes paymasterAndData;
        bytes signature;
    }

    // EntryPoint surface. `nonceOf` is the legacy getter kept by older
    // deployments; the builder falls back to it when `getNonce` reverts.
    function getNonce(address sender) returns (uint256);
    function nonceOf(address sender) returns (uint256);
    function getUserOpHash(UserOperationStruct userOp) returns (bytes32);
    function handleOps(UserOperationStruct[] ops, address beneficiary);
}
